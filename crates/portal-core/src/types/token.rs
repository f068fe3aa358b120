//! Token pair as returned by login, OAuth callback, and renewal endpoints.

use serde::{Deserialize, Serialize};

/// A freshly issued token pair with relative lifetimes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Bearer access token.
    pub access_token: String,
    /// Refresh token used to obtain the next pair.
    pub refresh_token: String,
    /// Token type, normally `"bearer"`.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Access token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Refresh token lifetime in seconds.
    #[serde(default)]
    pub refresh_expires_in: Option<u64>,
}

impl TokenPair {
    /// Creates a pair with explicit lifetimes.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in: u64,
        refresh_expires_in: u64,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            token_type: default_token_type(),
            expires_in: Some(expires_in),
            refresh_expires_in: Some(refresh_expires_in),
        }
    }
}

fn default_token_type() -> String {
    "bearer".to_string()
}
