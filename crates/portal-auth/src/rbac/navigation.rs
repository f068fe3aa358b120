//! Scopes permission results to the navigation that requested them.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use super::gate::{PermissionDecision, RoutePermissionGate};

/// Result of a navigation check.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationVerdict {
    /// Still the latest navigation; apply the decision.
    Current(PermissionDecision),
    /// A newer navigation started while this one was resolving. The
    /// decision is only meaningful for its own `route_path`.
    Superseded(PermissionDecision),
}

impl NavigationVerdict {
    pub fn is_current(&self) -> bool {
        matches!(self, Self::Current(_))
    }

    pub fn decision(&self) -> &PermissionDecision {
        match self {
            Self::Current(decision) | Self::Superseded(decision) => decision,
        }
    }

    /// Whether the caller should let the navigation through.
    pub fn allows(&self) -> bool {
        matches!(self, Self::Current(decision) if decision.granted)
    }
}

/// Runs a permission check per navigation and flags results that a later
/// navigation has overtaken.
#[derive(Debug)]
pub struct NavigationGuard {
    gate: Arc<RoutePermissionGate>,
    generation: AtomicU64,
}

impl NavigationGuard {
    pub fn new(gate: Arc<RoutePermissionGate>) -> Self {
        Self {
            gate,
            generation: AtomicU64::new(0),
        }
    }

    /// Starts a navigation to `route_path` and resolves its permission.
    pub async fn navigate(&self, route_path: &str) -> NavigationVerdict {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let decision = self.gate.check_permission(route_path).await;

        if self.generation.load(Ordering::SeqCst) == ticket {
            NavigationVerdict::Current(decision)
        } else {
            debug!(route_path, "Permission result superseded by a newer navigation");
            NavigationVerdict::Superseded(decision)
        }
    }

    /// Number of navigations started so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
