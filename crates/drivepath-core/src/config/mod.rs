//! Configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from an
//! optional TOML file overlaid with `DRIVEPATH__*` environment variables.
//! Each sub-module represents a logical configuration section.

pub mod cache;
pub mod export;
pub mod logging;
pub mod remote;
pub mod retry;

use serde::{Deserialize, Serialize};

pub use self::cache::PathCacheConfig;
pub use self::export::ExportConfig;
pub use self::logging::LoggingConfig;
pub use self::remote::RemoteConfig;
pub use self::retry::RetryConfig;

use crate::error::AppError;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Remote API settings.
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Transient-fault retry settings.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Path cache settings.
    #[serde(default)]
    pub cache: PathCacheConfig,
    /// Export preconditions.
    #[serde(default)]
    pub export: ExportConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DriveConfig {
    /// Load configuration from a TOML file (optional) and the environment.
    ///
    /// Environment variables use the `DRIVEPATH` prefix and `__` as the
    /// section separator, e.g. `DRIVEPATH__REMOTE__ACCESS_TOKEN`.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("DRIVEPATH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
