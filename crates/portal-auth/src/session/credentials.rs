//! The access/refresh credential pair and its absolute expiries.

use serde::{Deserialize, Serialize};

use portal_core::config::RenewalConfig;
use portal_core::types::TokenPair;

/// A credential pair with absolute expiries in epoch milliseconds.
///
/// Expiries are computed once, when the pair is issued, and never
/// re-derived from the token contents.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    /// Bearer access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Access token expiry, epoch milliseconds.
    pub access_expires_at: i64,
    /// Refresh token expiry, epoch milliseconds.
    pub refresh_expires_at: i64,
}

impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("access_expires_at", &self.access_expires_at)
            .field("refresh_expires_at", &self.refresh_expires_at)
            .finish()
    }
}

impl CredentialPair {
    /// Converts an issued token pair, anchoring its lifetimes at `now_ms`.
    ///
    /// A missing or zero lifetime falls back to the configured default.
    pub fn from_token_pair(pair: &TokenPair, now_ms: i64, defaults: &RenewalConfig) -> Self {
        let access_ttl = pair
            .expires_in
            .filter(|ttl| *ttl > 0)
            .unwrap_or(defaults.default_access_ttl_seconds);
        let refresh_ttl = pair
            .refresh_expires_in
            .filter(|ttl| *ttl > 0)
            .unwrap_or(defaults.default_refresh_ttl_seconds);

        Self {
            access_token: pair.access_token.clone(),
            refresh_token: pair.refresh_token.clone(),
            access_expires_at: now_ms.saturating_add(secs_to_ms(access_ttl)),
            refresh_expires_at: now_ms.saturating_add(secs_to_ms(refresh_ttl)),
        }
    }

    /// Whether the refresh token's expiry has strictly passed.
    pub fn is_refresh_expired_at(&self, now_ms: i64) -> bool {
        now_ms > self.refresh_expires_at
    }

    /// Whether the stored access expiry has been reached.
    pub fn is_access_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.access_expires_at
    }
}

fn secs_to_ms(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX).saturating_mul(1000)
}
