//! Path cache configuration.

use serde::{Deserialize, Serialize};

/// Settings for the path-to-id cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathCacheConfig {
    /// Whether to hydrate from and flush to a snapshot file.
    #[serde(default)]
    pub persist: bool,
    /// Location of the JSON snapshot.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

impl Default for PathCacheConfig {
    fn default() -> Self {
        Self {
            persist: false,
            snapshot_path: default_snapshot_path(),
        }
    }
}

fn default_snapshot_path() -> String {
    "./PathStorage.json".to_string()
}
