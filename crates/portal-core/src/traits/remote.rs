//! Remote endpoints consumed by the session subsystem.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{TokenPair, UserRole};

/// The external token renewal endpoint.
#[async_trait]
pub trait RenewalEndpoint: Send + Sync + std::fmt::Debug + 'static {
    /// Exchange a refresh token for a new token pair.
    ///
    /// Timeouts map to `ErrorKind::Timeout`, network and server failures to
    /// `ErrorKind::ExternalService`.
    async fn renew(&self, refresh_token: &str) -> AppResult<TokenPair>;

    /// Invalidate a refresh token server-side.
    async fn revoke(&self, refresh_token: &str) -> AppResult<()>;
}

/// The external route permission lookup.
#[async_trait]
pub trait PermissionLookup: Send + Sync + std::fmt::Debug + 'static {
    /// Whether `role` may access `route_path`. An `Err` means the lookup
    /// itself failed, not that access was denied.
    async fn check(&self, route_path: &str, role: UserRole) -> AppResult<bool>;
}

/// Supplies the current bearer token to outgoing requests.
#[async_trait]
pub trait AccessTokenSource: Send + Sync + 'static {
    /// The access token to send, if any.
    async fn access_token(&self) -> Option<String>;
}
