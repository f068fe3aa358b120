//! Route permission gate configuration.

use serde::{Deserialize, Serialize};

/// Route permission gate settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionsConfig {
    /// Roles granted every route without a remote lookup.
    #[serde(default = "default_privileged_roles")]
    pub privileged_roles: Vec<String>,
    /// Roles whose access is resolved by the permission service. Any other
    /// non-privileged role is denied locally.
    #[serde(default = "default_checked_roles")]
    pub checked_roles: Vec<String>,
    /// How long a remote answer is reused for the same route and user.
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            privileged_roles: default_privileged_roles(),
            checked_roles: default_checked_roles(),
            cache_ttl_seconds: default_cache_ttl_seconds(),
        }
    }
}

fn default_privileged_roles() -> Vec<String> {
    vec!["admin".to_string(), "superuser".to_string()]
}

fn default_checked_roles() -> Vec<String> {
    vec!["agent".to_string(), "lawyer".to_string()]
}

fn default_cache_ttl_seconds() -> u64 {
    300
}
