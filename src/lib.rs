// File-backed store of claimable body rewards, bounded per owner with
// oldest-first eviction.

pub mod config;
pub mod error;
pub mod model;
pub mod store;

pub use config::StoreConfig;
pub use error::StoreError;
pub use model::{Body, BodyCollection, BodySource, MAX_BODIES_PER_OWNER};
pub use store::BodyStore;
