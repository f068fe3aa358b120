//! Test helpers: unsigned token builders and collaborator fakes.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use portal_core::config::RenewalConfig;
use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_core::traits::{PermissionLookup, RenewalEndpoint};
use portal_core::types::{TokenPair, UserRole};
use portal_storage::memory::MemoryCredentialStorage;

use crate::session::{CredentialStore, SessionManager};

/// Builds an unsigned three-segment token around a raw JSON payload.
pub fn make_token_from_json(payload: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.as_bytes());
    format!("{header}.{body}.signature")
}

/// Builds an unsigned access token for `sub` with an optional `exp` (seconds).
pub fn make_token(sub: &str, exp: Option<i64>) -> String {
    let mut payload = serde_json::json!({ "sub": sub, "type": "access" });
    if let Some(exp) = exp {
        payload["exp"] = serde_json::json!(exp);
    }
    make_token_from_json(&payload.to_string())
}

/// An access token expiring `secs` seconds from now (negative for the past).
pub fn token_expiring_in(secs: i64) -> String {
    make_token("user-1", Some(chrono::Utc::now().timestamp() + secs))
}

/// A session manager over fresh in-memory storage.
pub async fn memory_session() -> Arc<SessionManager> {
    let storage = Arc::new(MemoryCredentialStorage::new());
    let store = CredentialStore::load(storage, "").await.unwrap();
    Arc::new(SessionManager::new(Arc::new(store), RenewalConfig::default()))
}

/// Renewal endpoint that counts calls and answers with a fixed result.
#[derive(Debug)]
pub struct FakeRenewal {
    pub calls: AtomicUsize,
    pub revokes: AtomicUsize,
    pub delay: Duration,
    pub result: AppResult<TokenPair>,
}

impl FakeRenewal {
    pub fn succeeding(pair: TokenPair) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            revokes: AtomicUsize::new(0),
            delay: Duration::ZERO,
            result: Ok(pair),
        }
    }

    pub fn failing(err: AppError) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            revokes: AtomicUsize::new(0),
            delay: Duration::ZERO,
            result: Err(err),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RenewalEndpoint for FakeRenewal {
    async fn renew(&self, _refresh_token: &str) -> AppResult<TokenPair> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }

    async fn revoke(&self, _refresh_token: &str) -> AppResult<()> {
        self.revokes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Permission lookup that counts calls and answers with a fixed result.
#[derive(Debug)]
pub struct FakeLookup {
    pub calls: AtomicUsize,
    pub delay: Duration,
    pub result: AppResult<bool>,
}

impl FakeLookup {
    pub fn answering(granted: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            result: Ok(granted),
        }
    }

    pub fn failing(err: AppError) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            result: Err(err),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionLookup for FakeLookup {
    async fn check(&self, _route_path: &str, _role: UserRole) -> AppResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }
}
