//! Per-navigation route permission checks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use portal_core::traits::{AuditSink, PermissionLookup};
use portal_core::types::{AuditEntry, AuditLevel, Principal, UserRole};

use crate::session::SessionManager;

use super::policies::RoutePolicy;

const AUDIT_CONTEXT: &str = "route_permission";

/// How a decision was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// No valid session or no principal; denied locally.
    Unauthenticated,
    /// Privileged role or superuser flag; granted locally.
    Privileged,
    /// Role is not subject to route policy; denied locally.
    Restricted,
    /// Answered by the permission service.
    Remote,
    /// Repeated from the previous check of the same route.
    Cached,
    /// The permission service failed and access was granted anyway.
    FailOpen,
}

/// The verdict for one route, tagged with the path it was resolved for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PermissionDecision {
    pub route_path: String,
    pub role: Option<UserRole>,
    pub granted: bool,
    pub source: DecisionSource,
    pub resolved_at: DateTime<Utc>,
}

impl PermissionDecision {
    fn new(route_path: &str, role: Option<UserRole>, granted: bool, source: DecisionSource) -> Self {
        Self {
            route_path: route_path.to_string(),
            role,
            granted,
            source,
            resolved_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MemoKey {
    route_path: String,
    role: UserRole,
    user_id: String,
}

#[derive(Debug)]
struct Memo {
    key: MemoKey,
    granted: bool,
    stored_at: Instant,
}

/// Resolves whether the current principal may open a route.
///
/// Only roles the policy marks for lookup reach the permission service.
/// For those, lookup failures grant access: a permission service outage
/// must not lock every user out. Such grants are audited at `warn` and never
/// memoized.
pub struct RoutePermissionGate {
    session: Arc<SessionManager>,
    lookup: Arc<dyn PermissionLookup>,
    audit: Arc<dyn AuditSink>,
    policy: RoutePolicy,
    /// Last remote answer; a different route, role or user misses, and so
    /// does an answer older than the policy's memo TTL.
    memo: Mutex<Option<Memo>>,
}

fn unauthenticated(route_path: &str) -> PermissionDecision {
    debug!(route_path, "Denying route: not authenticated");
    PermissionDecision::new(route_path, None, false, DecisionSource::Unauthenticated)
}

impl std::fmt::Debug for RoutePermissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutePermissionGate")
            .field("policy", &self.policy)
            .finish()
    }
}

impl RoutePermissionGate {
    pub fn new(
        session: Arc<SessionManager>,
        lookup: Arc<dyn PermissionLookup>,
        audit: Arc<dyn AuditSink>,
        policy: RoutePolicy,
    ) -> Self {
        Self {
            session,
            lookup,
            audit,
            policy,
            memo: Mutex::new(None),
        }
    }

    /// Resolves access to `route_path` for the current principal.
    pub async fn check_permission(&self, route_path: &str) -> PermissionDecision {
        match self.session.principal().await {
            Some(principal) => self.check_permission_as(&principal, route_path).await,
            None => unauthenticated(route_path),
        }
    }

    /// Resolves access to `route_path` for `principal`, which need not be
    /// the cached one. The session must still be valid.
    pub async fn check_permission_as(
        &self,
        principal: &Principal,
        route_path: &str,
    ) -> PermissionDecision {
        if !self.session.has_valid_session().await {
            return unauthenticated(route_path);
        }

        if self.policy.is_privileged(principal) {
            return PermissionDecision::new(
                route_path,
                Some(principal.role),
                true,
                DecisionSource::Privileged,
            );
        }

        if !self.policy.requires_lookup(principal.role) {
            debug!(route_path, role = %principal.role, "Denying route: role has no route access");
            return PermissionDecision::new(
                route_path,
                Some(principal.role),
                false,
                DecisionSource::Restricted,
            );
        }

        let key = MemoKey {
            route_path: route_path.to_string(),
            role: principal.role,
            user_id: principal.id.clone(),
        };
        if let Some(memo) = self.memo.lock().await.as_ref() {
            if memo.key == key && memo.stored_at.elapsed() < self.policy.memo_ttl() {
                return PermissionDecision::new(
                    route_path,
                    Some(principal.role),
                    memo.granted,
                    DecisionSource::Cached,
                );
            }
        }

        match self.lookup.check(route_path, principal.role).await {
            Ok(granted) => {
                self.record(principal, route_path, granted, None).await;
                *self.memo.lock().await = Some(Memo {
                    key,
                    granted,
                    stored_at: Instant::now(),
                });
                PermissionDecision::new(
                    route_path,
                    Some(principal.role),
                    granted,
                    DecisionSource::Remote,
                )
            }
            Err(e) => {
                warn!(
                    route_path,
                    user_id = %principal.id,
                    error = %e,
                    "Permission lookup failed, granting access"
                );
                self.record(principal, route_path, true, Some(e.to_string()))
                    .await;
                PermissionDecision::new(
                    route_path,
                    Some(principal.role),
                    true,
                    DecisionSource::FailOpen,
                )
            }
        }
    }

    /// Shorthand for `check_permission(..).granted`.
    pub async fn is_allowed(&self, route_path: &str) -> bool {
        self.check_permission(route_path).await.granted
    }

    /// Forgets the memoized answer.
    pub async fn invalidate(&self) {
        *self.memo.lock().await = None;
    }

    async fn record(
        &self,
        principal: &Principal,
        route_path: &str,
        granted: bool,
        error: Option<String>,
    ) {
        let (level, message) = match (&error, granted) {
            (Some(_), _) => (AuditLevel::Warn, "Route permission lookup failed"),
            (None, true) => (AuditLevel::Info, "Route access granted"),
            (None, false) => (AuditLevel::Warn, "Route access denied"),
        };
        let mut entry = AuditEntry::new(level, message, AUDIT_CONTEXT)
            .with_user(principal.id.clone(), principal.role.as_str())
            .with_route(route_path)
            .with_granted(granted);
        if let Some(error) = error {
            entry = entry.with_metadata(serde_json::json!({ "error": error }));
        }
        self.audit.record(entry).await;
    }
}
