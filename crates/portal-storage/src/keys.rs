//! Storage key naming for the persisted credential pair and its user.

/// Access token key.
pub const ACCESS_TOKEN: &str = "access_token";
/// Refresh token key.
pub const REFRESH_TOKEN: &str = "refresh_token";
/// Access expiry key (epoch milliseconds).
pub const ACCESS_EXPIRES_AT: &str = "access_expires_at";
/// Refresh expiry key (epoch milliseconds).
pub const REFRESH_EXPIRES_AT: &str = "refresh_expires_at";
/// Cached principal key (JSON).
pub const USER: &str = "user";

/// The storage keys of a session, with an optional prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialKeys {
    /// Access token key.
    pub access_token: String,
    /// Refresh token key.
    pub refresh_token: String,
    /// Access expiry key.
    pub access_expires_at: String,
    /// Refresh expiry key.
    pub refresh_expires_at: String,
    /// Cached principal key.
    pub user: String,
}

impl CredentialKeys {
    /// Builds the key set, prepending `prefix` to each name.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            access_token: format!("{prefix}{ACCESS_TOKEN}"),
            refresh_token: format!("{prefix}{REFRESH_TOKEN}"),
            access_expires_at: format!("{prefix}{ACCESS_EXPIRES_AT}"),
            refresh_expires_at: format!("{prefix}{REFRESH_EXPIRES_AT}"),
            user: format!("{prefix}{USER}"),
        }
    }

    /// The four credential pair keys, in schema order.
    pub fn pair(&self) -> [&str; 4] {
        [
            self.access_token.as_str(),
            self.refresh_token.as_str(),
            self.access_expires_at.as_str(),
            self.refresh_expires_at.as_str(),
        ]
    }

    /// Every session key: the pair keys followed by the user key.
    pub fn all(&self) -> [&str; 5] {
        let [access, refresh, access_exp, refresh_exp] = self.pair();
        [access, refresh, access_exp, refresh_exp, self.user.as_str()]
    }
}

impl Default for CredentialKeys {
    fn default() -> Self {
        Self::with_prefix("")
    }
}
