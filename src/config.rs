// Store configuration, loaded from environment variables.

use std::path::PathBuf;

/// Body store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path of the JSON file the store persists to.
    pub data_file: PathBuf,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// - `BODIES_FILE` - path of the backing JSON file
    ///   (default: `data/bodies.json`)
    pub fn load() -> Self {
        let data_file = std::env::var("BODIES_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/bodies.json"));

        StoreConfig { data_file }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data/bodies.json"),
        }
    }
}
