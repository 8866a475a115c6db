// Data model: body rewards and per-owner collections.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Maximum number of bodies a single owner may hold. Creating a body for an
/// owner already at this limit evicts that owner's oldest body first.
pub const MAX_BODIES_PER_OWNER: usize = 5;

/// A claimable body reward: a snapshot of a defeated opponent's attributes,
/// taken at creation time and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    /// 32 lowercase hex characters (16 random bytes), unique across the store.
    pub id: String,
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub name: String,
    pub health: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub special: String,
    /// Creation date, `YYYY-M-D` with a zero-based month (see [`since_stamp`]).
    pub since: String,
}

/// The attribute set a new body is copied from, supplied by the battle layer
/// on a win. Values are copied verbatim into the created [`Body`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodySource {
    pub name: String,
    pub health: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub special: String,
}

/// One owner's bodies, ordered by insertion time (oldest first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyCollection {
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub bodies: Vec<Body>,
}

impl BodyCollection {
    pub fn empty(owner_id: &str) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            bodies: Vec::new(),
        }
    }
}

/// Format a creation date the way existing store files record it.
///
/// The month is zero-based (January is `0`), so byte-level compatibility with
/// data written by earlier versions of the site is preserved.
pub fn since_stamp(date: NaiveDate) -> String {
    format!("{}-{}-{}", date.year(), date.month0(), date.day())
}
