//! Persisted credential storage configuration.

use serde::{Deserialize, Serialize};

/// Where the credential pair is persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage provider: `"file"` or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Path of the JSON document used by the file provider.
    #[serde(default = "default_path")]
    pub path: String,
    /// Prefix applied to every storage key.
    #[serde(default)]
    pub key_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            path: default_path(),
            key_prefix: String::new(),
        }
    }
}

fn default_provider() -> String {
    "file".to_string()
}

fn default_path() -> String {
    "data/session.json".to_string()
}
