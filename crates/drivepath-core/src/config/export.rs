//! Export precondition configuration.

use serde::{Deserialize, Serialize};

/// Limits checked before an export request is issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Largest resource size, in bytes, the remote API will export.
    #[serde(default = "default_max_export")]
    pub max_export_bytes: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_export_bytes: default_max_export(),
        }
    }
}

fn default_max_export() -> u64 {
    10 * 1024 * 1024 // 10 MB
}
