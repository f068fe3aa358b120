//! Request and response bodies of the remote auth API.

use serde::{Deserialize, Serialize};

/// Body of the refresh and logout calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Body of the route permission lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionCheckRequest {
    pub route_path: String,
    pub role: String,
}

/// Answer of the route permission lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionCheckResponse {
    pub has_access: bool,
}

/// Error body returned by the API (`{"detail": "..."}`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Best-effort human-readable detail from a raw response body.
    pub fn describe(body: &str) -> String {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody {
                detail: Some(serde_json::Value::String(detail)),
            }) => detail,
            Ok(ErrorBody {
                detail: Some(detail),
            }) => detail.to_string(),
            _ => body.chars().take(200).collect(),
        }
    }
}
