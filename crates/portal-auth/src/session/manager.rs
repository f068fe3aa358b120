//! Session context: credentials, principal, and lifecycle notifications.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{info, warn};

use portal_core::config::RenewalConfig;
use portal_core::events::{ClearReason, SessionEvent};
use portal_core::result::AppResult;
use portal_core::traits::{AccessTokenSource, RenewalEndpoint};
use portal_core::types::{Principal, TokenPair};

use crate::jwt::codec::now_ms;

use super::credentials::CredentialPair;
use super::store::CredentialStore;

const EVENT_CAPACITY: usize = 64;

/// Lifetime-scoped session context shared by the renewal coordinator, the
/// permission gate and the HTTP layer.
pub struct SessionManager {
    /// Credential and user persistence.
    store: Arc<CredentialStore>,
    /// Lifecycle notifications.
    events: broadcast::Sender<SessionEvent>,
    /// Token lifetime defaults.
    config: RenewalConfig,
    /// Remote logout, if wired.
    logout_endpoint: Option<Arc<dyn RenewalEndpoint>>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("store", &self.store.provider_type())
            .field("config", &self.config)
            .finish()
    }
}

impl SessionManager {
    /// Creates a session context over an already loaded store.
    pub fn new(store: Arc<CredentialStore>, config: RenewalConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            events,
            config,
            logout_endpoint: None,
        }
    }

    /// Sends the refresh token to `endpoint` on logout.
    pub fn with_logout_endpoint(mut self, endpoint: Arc<dyn RenewalEndpoint>) -> Self {
        self.logout_endpoint = Some(endpoint);
        self
    }

    /// Seeds the session from a freshly issued token pair (login, OAuth
    /// callback, re-login). The principal is cached next to the pair so a
    /// restarted process still knows who the session belongs to.
    pub async fn establish(
        &self,
        tokens: &TokenPair,
        principal: Option<Principal>,
    ) -> AppResult<CredentialPair> {
        let pair = CredentialPair::from_token_pair(tokens, now_ms(), &self.config);
        self.store.set(pair.clone()).await?;

        let user_id = principal.as_ref().map(|p| p.id.clone());
        self.store.set_principal(principal).await?;

        info!(user_id = ?user_id, "Session established");
        let _ = self.events.send(SessionEvent::Established { user_id });
        Ok(pair)
    }

    /// Applies a renewed pair unless the session was cleared or rotated
    /// while the renewal call was in flight.
    pub async fn apply_renewal(&self, expected_refresh: &str, pair: CredentialPair) -> bool {
        let access_expires_at = pair.access_expires_at;
        match self.store.replace_if(expected_refresh, pair).await {
            Ok(true) => {
                let _ = self.events.send(SessionEvent::Renewed { access_expires_at });
                true
            }
            Ok(false) => false,
            Err(e) => {
                // The in-memory pair was still swapped.
                warn!(error = %e, "Renewed credentials were not persisted");
                let _ = self.events.send(SessionEvent::Renewed { access_expires_at });
                true
            }
        }
    }

    /// Whether a usable session exists: a live refresh token, or failing
    /// that a live access token.
    pub async fn has_valid_session(&self) -> bool {
        self.has_valid_session_at(now_ms()).await
    }

    /// [`has_valid_session`](Self::has_valid_session) against an explicit clock.
    pub async fn has_valid_session_at(&self, now_ms: i64) -> bool {
        match self.store.get().await {
            Some(pair) => {
                (!pair.refresh_token.is_empty() && now_ms < pair.refresh_expires_at)
                    || (!pair.access_token.is_empty() && !pair.is_access_expired_at(now_ms))
            }
            None => false,
        }
    }

    /// Current bearer token, if any.
    pub async fn access_token(&self) -> Option<String> {
        self.store.get().await.map(|pair| pair.access_token)
    }

    /// Snapshot of the current credential pair.
    pub async fn credentials(&self) -> Option<CredentialPair> {
        self.store.get().await
    }

    pub async fn principal(&self) -> Option<Principal> {
        self.store.principal().await
    }

    /// Replaces the cached user, e.g. after a profile refresh.
    pub async fn set_principal(&self, principal: Option<Principal>) -> AppResult<()> {
        self.store.set_principal(principal).await
    }

    /// Whether the session is valid and a principal is known.
    pub async fn is_authenticated(&self) -> bool {
        self.store.principal().await.is_some() && self.has_valid_session().await
    }

    /// Subscribes to lifecycle events; `Cleared` is the forced-logout signal.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Clears credentials and principal, then notifies subscribers.
    pub async fn clear(&self, reason: ClearReason) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to remove persisted credentials");
        }

        info!(reason = ?reason, "Session cleared");
        let _ = self.events.send(SessionEvent::Cleared { reason });
    }

    /// Logs out: revokes the refresh token remotely (best effort), then
    /// clears the session.
    pub async fn logout(&self) {
        if let (Some(endpoint), Some(pair)) = (&self.logout_endpoint, self.store.get().await) {
            if let Err(e) = endpoint.revoke(&pair.refresh_token).await {
                warn!(error = %e, "Remote logout failed, clearing locally");
            }
        }
        self.clear(ClearReason::Logout).await;
    }

    /// Drops a session the server has rejected.
    pub async fn revoke(&self) {
        self.clear(ClearReason::Revoked).await;
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }
}

#[async_trait]
impl AccessTokenSource for SessionManager {
    async fn access_token(&self) -> Option<String> {
        SessionManager::access_token(self).await
    }
}
