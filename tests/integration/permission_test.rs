//! Integration tests for route permission checks over HTTP.

use std::sync::atomic::Ordering;

use portal_auth::rbac::DecisionSource;
use portal_core::types::{AuditLevel, Principal, TokenPair, UserRole};

use crate::helpers::{TestContext, token_expiring_in};

async fn login(ctx: &TestContext, role: UserRole) -> String {
    let access = token_expiring_in("user-9", 3_600);
    ctx.session
        .establish(
            &TokenPair::new(access.clone(), "refresh-9", 3_600, 86_400),
            Some(Principal::new("user-9", "user9@example.com", role)),
        )
        .await
        .unwrap();
    access
}

#[tokio::test]
async fn test_lookup_sends_route_role_and_bearer() {
    let ctx = TestContext::new().await;
    let access = login(&ctx, UserRole::Lawyer).await;

    let decision = ctx.gate.check_permission("/expedientes/42").await;

    assert!(decision.granted);
    assert_eq!(decision.source, DecisionSource::Remote);
    assert_eq!(decision.route_path, "/expedientes/42");

    let requests = ctx.server.state.permission_requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["route_path"], "/expedientes/42");
    assert_eq!(requests[0]["role"], "lawyer");
    assert_eq!(
        ctx.server.state.bearer_seen.lock().unwrap()[0].as_deref(),
        Some(access.as_str())
    );
}

#[tokio::test]
async fn test_denial_is_audited() {
    let ctx = TestContext::new().await;
    login(&ctx, UserRole::Agent).await;
    ctx.server.state.grant.store(false, Ordering::SeqCst);

    assert!(!ctx.gate.is_allowed("/pipelines").await);

    let entries = ctx.audit.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].level, AuditLevel::Warn);
    assert_eq!(entries[0].context, "route_permission");
    assert_eq!(entries[0].user_id.as_deref(), Some("user-9"));
    assert_eq!(entries[0].route_path.as_deref(), Some("/pipelines"));
    assert_eq!(entries[0].granted, Some(false));
}

/// Permission service outages grant access; see `RoutePermissionGate`.
#[tokio::test]
async fn test_service_outage_fails_open() {
    let ctx = TestContext::new().await;
    login(&ctx, UserRole::Agent).await;
    ctx.server
        .state
        .permission_status
        .store(503, Ordering::SeqCst);

    let decision = ctx.gate.check_permission("/wizard/step-2").await;

    assert!(decision.granted);
    assert_eq!(decision.source, DecisionSource::FailOpen);
    let entries = ctx.audit.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].granted, Some(true));
    assert_eq!(entries[0].level, AuditLevel::Warn);
}

#[tokio::test]
async fn test_plain_user_is_denied_during_outage() {
    let ctx = TestContext::new().await;
    login(&ctx, UserRole::User).await;
    ctx.server
        .state
        .permission_status
        .store(503, Ordering::SeqCst);

    let decision = ctx.gate.check_permission("/admin/settings").await;

    assert!(!decision.granted);
    assert_eq!(decision.source, DecisionSource::Restricted);
    assert_eq!(ctx.server.state.permission_calls(), 0);
    assert!(ctx.audit.entries().await.is_empty());
}

#[tokio::test]
async fn test_privileged_role_never_calls_service() {
    let ctx = TestContext::new().await;
    login(&ctx, UserRole::Admin).await;
    ctx.server
        .state
        .permission_status
        .store(500, Ordering::SeqCst);

    for route in ["/admin/users", "/settings", "/reports"] {
        assert!(ctx.gate.is_allowed(route).await);
    }
    assert_eq!(ctx.server.state.permission_calls(), 0);
}

#[tokio::test]
async fn test_logged_out_user_is_denied_without_call() {
    let ctx = TestContext::new().await;

    assert!(!ctx.gate.is_allowed("/expedientes").await);
    assert_eq!(ctx.server.state.permission_calls(), 0);
}
