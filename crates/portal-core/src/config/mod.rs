//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from an
//! optional TOML file plus `PORTAL__`-prefixed environment variables. Every
//! field carries a serde default, so an empty source yields a usable config.

pub mod api;
pub mod audit;
pub mod logging;
pub mod permissions;
pub mod renewal;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::api::ApiConfig;
pub use self::audit::AuditConfig;
pub use self::logging::LoggingConfig;
pub use self::permissions::PermissionsConfig;
pub use self::renewal::RenewalConfig;
pub use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote auth API settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Renewal coordinator settings.
    #[serde(default)]
    pub renewal: RenewalConfig,
    /// Route permission gate settings.
    #[serde(default)]
    pub permissions: PermissionsConfig,
    /// Persisted credential storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Audit sink settings.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file (optional) and the environment.
    ///
    /// Environment variables use the `PORTAL__` prefix and `__` as the
    /// section separator, e.g. `PORTAL__API__BASE_URL`.
    pub fn load(path: Option<&str>) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("PORTAL")
                    .prefix_separator("__")
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
