// Error types for the body store.

use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by store operations.
///
/// Absent bodies and absent collections are not errors: lookups return
/// `Option` for those, since probing a stale or already-claimed id is a
/// normal outcome.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("body store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but does not parse as a body store.
    #[error("body store file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An empty collection was requested for an owner who already has one.
    /// The store holds at most one collection per owner.
    #[error("owner {0} already has a body collection")]
    DuplicateCollection(String),
}
