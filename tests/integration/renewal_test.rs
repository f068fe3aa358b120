//! Integration tests for token renewal over HTTP.

use std::sync::atomic::Ordering;
use std::time::Duration;

use portal_auth::session::{CoordinatorState, RenewalOutcome};
use portal_core::types::AuditLevel;

use crate::helpers::{TestContext, now_ms};

#[tokio::test]
async fn test_expiring_token_is_renewed() {
    let ctx = TestContext::new().await;
    let before = ctx.seed(60, 86_400_000).await;

    let outcome = ctx.coordinator.run_cycle().await;

    assert_eq!(outcome, RenewalOutcome::Renewed);
    assert_eq!(ctx.server.state.refresh_calls(), 1);
    assert_eq!(
        ctx.server.state.refresh_tokens_seen.lock().unwrap().as_slice(),
        ["refresh-1".to_string()]
    );

    let after = ctx.session.credentials().await.unwrap();
    assert_ne!(after.access_token, before.access_token);
    assert_eq!(after.refresh_token, "refresh-rotated-1");
    assert!(after.access_expires_at > now_ms() + 3_500_000);
    assert!(after.refresh_expires_at > now_ms() + 86_000_000);

    // the persisted copy carries exactly the new values
    let persisted = ctx
        .storage
        .get_many(&["access_token", "refresh_token", "refresh_expires_at"])
        .await
        .unwrap();
    assert_eq!(persisted[0].as_deref(), Some(after.access_token.as_str()));
    assert_eq!(persisted[1].as_deref(), Some("refresh-rotated-1"));
    assert_eq!(
        persisted[2].as_deref(),
        Some(after.refresh_expires_at.to_string().as_str())
    );
}

#[tokio::test]
async fn test_fresh_token_makes_no_call() {
    let ctx = TestContext::new().await;
    ctx.seed(3_600, 86_400_000).await;

    assert_eq!(ctx.coordinator.run_cycle().await, RenewalOutcome::NotDue);
    assert_eq!(ctx.server.state.refresh_calls(), 0);
}

#[tokio::test]
async fn test_anonymous_visitor_makes_no_call() {
    let ctx = TestContext::new().await;

    assert_eq!(ctx.coordinator.run_cycle().await, RenewalOutcome::NoSession);
    assert_eq!(ctx.coordinator.state(), CoordinatorState::Idle);
    assert_eq!(ctx.server.state.refresh_calls(), 0);
}

#[tokio::test]
async fn test_overlapping_triggers_make_one_call() {
    let ctx = TestContext::new().await;
    ctx.seed(60, 86_400_000).await;
    ctx.server.state.set_delay(Duration::from_millis(300));

    let (a, b, c) = tokio::join!(
        ctx.coordinator.run_cycle(),
        ctx.coordinator.request_renewal(),
        ctx.coordinator.run_cycle(),
    );

    assert_eq!(ctx.server.state.refresh_calls(), 1);
    let outcomes = [a, b, c];
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| **o == RenewalOutcome::Renewed)
            .count(),
        1
    );
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| **o == RenewalOutcome::InFlight)
            .count(),
        2
    );
}

#[tokio::test]
async fn test_server_error_keeps_credentials() {
    for code in [500u16, 502, 401] {
        let ctx = TestContext::new().await;
        let before = ctx.seed(60, 86_400_000).await;
        ctx.server.state.refresh_status.store(code, Ordering::SeqCst);

        assert_eq!(
            ctx.coordinator.run_cycle().await,
            RenewalOutcome::TransientFailure
        );
        assert_eq!(ctx.session.credentials().await, Some(before));
        assert_eq!(ctx.coordinator.state(), CoordinatorState::Idle);

        let entries = ctx.audit.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, AuditLevel::Warn);
    }
}

#[tokio::test]
async fn test_timeout_is_transient() {
    let ctx = TestContext::new().await;
    let before = ctx.seed(60, 86_400_000).await;
    ctx.server.state.set_delay(Duration::from_millis(1_500));

    assert_eq!(
        ctx.coordinator.run_cycle().await,
        RenewalOutcome::TransientFailure
    );
    assert_eq!(ctx.session.credentials().await, Some(before));

    let entries = ctx.audit.entries().await;
    assert_eq!(entries[0].metadata["kind"], "TIMEOUT");
}

#[tokio::test]
async fn test_expired_refresh_token_clears_without_calling() {
    let ctx = TestContext::new().await;
    ctx.seed(60, -1).await;
    let mut events = ctx.session.subscribe();

    assert_eq!(
        ctx.coordinator.run_cycle().await,
        RenewalOutcome::SessionExpired
    );
    assert_eq!(ctx.server.state.refresh_calls(), 0);
    assert_eq!(ctx.coordinator.state(), CoordinatorState::Failed);
    assert!(events.recv().await.unwrap().is_cleared());

    let persisted = ctx
        .storage
        .get_many(&[
            "access_token",
            "refresh_token",
            "access_expires_at",
            "refresh_expires_at",
        ])
        .await
        .unwrap();
    assert!(persisted.iter().all(Option::is_none));
}
