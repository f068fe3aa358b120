//! Remote auth API configuration.

use serde::{Deserialize, Serialize};

/// Endpoints and timeouts of the remote authentication API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL all paths are joined onto.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds, applied to every remote call.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Path of the token renewal endpoint.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Path of the logout endpoint.
    #[serde(default = "default_logout_path")]
    pub logout_path: String,
    /// Path of the route permission lookup endpoint.
    #[serde(default = "default_permission_path")]
    pub permission_path: String,
}

impl ApiConfig {
    /// Join a configured path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            refresh_path: default_refresh_path(),
            logout_path: default_logout_path(),
            permission_path: default_permission_path(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_refresh_path() -> String {
    "/auth/refresh".to_string()
}

fn default_logout_path() -> String {
    "/auth/logout".to_string()
}

fn default_permission_path() -> String {
    "/route-permissions/check".to_string()
}
