// The body store: per-owner bounded collections of claimable body rewards,
// persisted to a single JSON file.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use rand::RngCore;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::model::{since_stamp, Body, BodyCollection, BodySource, MAX_BODIES_PER_OWNER};

/// Thread-safe, file-backed store of body rewards.
///
/// The canonical state is held in memory and written through to the backing
/// file on every mutation. Mutating operations stage their change on a copy
/// and only commit it once the file write succeeded, so a persistence failure
/// never leaves memory and disk disagreeing. Reads never touch the file.
///
/// Cloning is cheap and yields a handle to the same store.
#[derive(Debug, Clone)]
pub struct BodyStore {
    path: PathBuf,
    collections: Arc<RwLock<Vec<BodyCollection>>>,
}

impl BodyStore {
    /// Open the store backed by the given file. A missing file yields an
    /// empty store; the file is created on the first mutation.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let collections = if path.exists() {
            load_from_file(&path)?
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            collections: Arc::new(RwLock::new(collections)),
        })
    }

    /// Open the store described by a [`StoreConfig`], creating parent
    /// directories of the backing file if needed.
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.data_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: config.data_file.clone(),
                    source,
                })?;
            }
        }
        Self::open(&config.data_file)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a body for `owner_id` from the given attribute source and
    /// persist it. The owner's collection is created if absent; if it is
    /// already full, the oldest body is evicted first, so no collection ever
    /// exceeds [`MAX_BODIES_PER_OWNER`].
    ///
    /// On success the body is durable in the backing file. On error nothing
    /// was applied.
    pub fn create_body(&self, owner_id: &str, source: &BodySource) -> Result<Body, StoreError> {
        let body = Body {
            id: generate_body_id(),
            owner_id: owner_id.to_string(),
            name: source.name.clone(),
            health: source.health,
            attack: source.attack,
            defense: source.defense,
            speed: source.speed,
            special: source.special.clone(),
            since: since_stamp(chrono::Local::now().date_naive()),
        };

        let mut collections = self.collections.write().unwrap();
        let mut staged = collections.clone();

        let index = match staged.iter().position(|c| c.owner_id == owner_id) {
            Some(index) => index,
            None => {
                staged.push(BodyCollection::empty(owner_id));
                staged.len() - 1
            }
        };

        let bodies = &mut staged[index].bodies;
        let evicted = if bodies.len() >= MAX_BODIES_PER_OWNER {
            // Oldest first: insertion order, front of the list.
            Some(bodies.remove(0))
        } else {
            None
        };
        bodies.push(body.clone());
        debug_assert!(bodies.len() <= MAX_BODIES_PER_OWNER);

        save_to_file(&self.path, &staged)?;
        *collections = staged;

        if let Some(old) = &evicted {
            tracing::debug!(owner_id, evicted_id = %old.id, "evicted oldest body at capacity");
        }
        tracing::debug!(owner_id, body_id = %body.id, "created body");
        Ok(body)
    }

    /// Look up a body by id across all owners. `None` is the normal outcome
    /// for a stale or already-claimed id.
    pub fn body_by_id(&self, id: &str) -> Option<Body> {
        let collections = self.collections.read().unwrap();
        collections
            .iter()
            .flat_map(|c| c.bodies.iter())
            .find(|b| b.id == id)
            .cloned()
    }

    /// Delete the body with the given id from whichever collection holds it
    /// and persist. Deleting an unknown id is a no-op. Returns whether a body
    /// was removed.
    pub fn delete_body_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().unwrap();
        let mut staged = collections.clone();

        let mut removed = 0usize;
        for collection in staged.iter_mut() {
            let before = collection.bodies.len();
            collection.bodies.retain(|b| b.id != id);
            removed += before - collection.bodies.len();
        }

        if removed == 0 {
            return Ok(false);
        }
        if removed > 1 {
            // Ids are 128-bit random values; more than one match means the
            // store's uniqueness invariant was already broken.
            tracing::warn!(body_id = %id, count = removed, "removed duplicate body ids");
            debug_assert!(false, "duplicate body id in store: {id}");
        }

        save_to_file(&self.path, &staged)?;
        *collections = staged;

        tracing::debug!(body_id = %id, "deleted body");
        Ok(true)
    }

    /// Positional index of the owner's collection in the persisted sequence.
    ///
    /// `None` means the owner has no collection; it is distinct from
    /// `Some(0)`, a collection sitting at the first position.
    pub fn collection_index_by_owner(&self, owner_id: &str) -> Option<usize> {
        let collections = self.collections.read().unwrap();
        collections.iter().position(|c| c.owner_id == owner_id)
    }

    /// The owner's collection, created empty (and persisted) first if absent.
    ///
    /// Creation happens under the store's write lock, so concurrent first
    /// accesses for the same owner produce exactly one collection.
    pub fn get_or_create_collection(&self, owner_id: &str) -> Result<BodyCollection, StoreError> {
        let mut collections = self.collections.write().unwrap();

        if let Some(existing) = collections.iter().find(|c| c.owner_id == owner_id) {
            return Ok(existing.clone());
        }

        let created = BodyCollection::empty(owner_id);
        let mut staged = collections.clone();
        staged.push(created.clone());
        save_to_file(&self.path, &staged)?;
        *collections = staged;

        tracing::debug!(owner_id, "created empty body collection");
        Ok(created)
    }

    /// Append a new empty collection for `owner_id` and persist.
    ///
    /// Fails with [`StoreError::DuplicateCollection`] if the owner already
    /// has one; the store holds at most one collection per owner. Prefer
    /// [`BodyStore::get_or_create_collection`] unless absence was already
    /// established.
    pub fn add_empty_collection(&self, owner_id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().unwrap();

        if collections.iter().any(|c| c.owner_id == owner_id) {
            return Err(StoreError::DuplicateCollection(owner_id.to_string()));
        }

        let mut staged = collections.clone();
        staged.push(BodyCollection::empty(owner_id));
        save_to_file(&self.path, &staged)?;
        *collections = staged;

        tracing::debug!(owner_id, "created empty body collection");
        Ok(())
    }

    /// Snapshot of every collection in the store, in persisted order.
    pub fn all_collections(&self) -> Vec<BodyCollection> {
        self.collections.read().unwrap().clone()
    }
}

/// Generate a fresh body id: 16 random bytes, hex-encoded. Collisions are
/// negligible at 128 bits, so no existence check is made.
fn generate_body_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn load_from_file(path: &Path) -> Result<Vec<BodyCollection>, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

fn save_to_file(path: &Path, collections: &[BodyCollection]) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    // Write to temp file first, then rename (atomic)
    let tmp_path = path.with_extension("json.tmp");
    {
        let file = File::create(&tmp_path).map_err(io_err)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer(writer, collections).map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
    }

    fs::rename(&tmp_path, path).map_err(io_err)
}
