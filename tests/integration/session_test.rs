//! Integration tests for session establishment, logout and persistence.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use portal_auth::rbac::DecisionSource;
use portal_auth::session::CredentialStore;
use portal_core::events::{ClearReason, SessionEvent};
use portal_core::traits::CredentialStorage;
use portal_core::types::{Principal, TokenPair, UserRole};
use portal_storage::file::FileCredentialStorage;

use crate::helpers::{TestContext, token_expiring_in};

#[tokio::test]
async fn test_logout_revokes_and_clears() {
    let ctx = TestContext::new().await;
    ctx.seed(3_600, 86_400_000).await;
    let mut events = ctx.session.subscribe();

    ctx.session.logout().await;

    assert_eq!(ctx.server.state.logout_calls(), 1);
    assert_eq!(
        ctx.server.state.logout_tokens_seen.lock().unwrap().as_slice(),
        ["refresh-1".to_string()]
    );
    assert!(!ctx.session.has_valid_session().await);
    assert_eq!(ctx.session.access_token().await, None);
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::Cleared {
            reason: ClearReason::Logout
        }
    );
}

#[tokio::test]
async fn test_logout_clears_even_when_server_fails() {
    let ctx = TestContext::new().await;
    ctx.seed(3_600, 86_400_000).await;
    ctx.server.state.logout_status.store(500, Ordering::SeqCst);

    ctx.session.logout().await;

    assert_eq!(ctx.server.state.logout_calls(), 1);
    assert!(!ctx.session.store().has_credentials().await);
}

#[tokio::test]
async fn test_session_survives_restart_with_file_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let storage: Arc<dyn CredentialStorage> =
        Arc::new(FileCredentialStorage::open(&path).await.unwrap());
    let ctx = TestContext::with_storage(storage).await;
    let pair = ctx
        .session
        .establish(
            &TokenPair::new(token_expiring_in("user-1", 3_600), "refresh-a", 3_600, 86_400),
            None,
        )
        .await
        .unwrap();
    drop(ctx);

    let reopened: Arc<dyn CredentialStorage> =
        Arc::new(FileCredentialStorage::open(&path).await.unwrap());
    let store = CredentialStore::load(reopened, "").await.unwrap();
    assert_eq!(store.get().await, Some(pair));
}

#[tokio::test]
async fn test_renewal_after_restart_uses_persisted_refresh_token() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    {
        let storage: Arc<dyn CredentialStorage> =
            Arc::new(FileCredentialStorage::open(&path).await.unwrap());
        let ctx = TestContext::with_storage(storage).await;
        ctx.seed(60, 86_400_000).await;
    }

    let storage: Arc<dyn CredentialStorage> =
        Arc::new(FileCredentialStorage::open(&path).await.unwrap());
    let ctx = TestContext::with_storage(storage).await;
    ctx.coordinator.run_cycle().await;

    assert_eq!(
        ctx.server.state.refresh_tokens_seen.lock().unwrap().as_slice(),
        ["refresh-1".to_string()]
    );
}

#[tokio::test]
async fn test_user_survives_restart_and_keeps_route_access() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    {
        let storage: Arc<dyn CredentialStorage> =
            Arc::new(FileCredentialStorage::open(&path).await.unwrap());
        let ctx = TestContext::with_storage(storage).await;
        ctx.session
            .establish(
                &TokenPair::new(token_expiring_in("user-7", 3_600), "refresh-7", 3_600, 86_400),
                Some(Principal::new("user-7", "lawyer@example.com", UserRole::Lawyer)),
            )
            .await
            .unwrap();
    }

    let storage: Arc<dyn CredentialStorage> =
        Arc::new(FileCredentialStorage::open(&path).await.unwrap());
    let ctx = TestContext::with_storage(storage).await;

    assert!(ctx.session.has_valid_session().await);
    let decision = ctx.gate.check_permission("/expedientes").await;
    assert!(decision.granted);
    assert_eq!(decision.source, DecisionSource::Remote);
    assert_eq!(decision.role, Some(UserRole::Lawyer));

    ctx.session.logout().await;
    let reopened: Arc<dyn CredentialStorage> =
        Arc::new(FileCredentialStorage::open(&path).await.unwrap());
    assert_eq!(reopened.get("user").await.unwrap(), None);
}
