//! Route permission gating.

pub mod gate;
pub mod navigation;
pub mod policies;

pub use gate::{DecisionSource, PermissionDecision, RoutePermissionGate};
pub use navigation::{NavigationGuard, NavigationVerdict};
pub use policies::RoutePolicy;
