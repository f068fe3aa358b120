//! # portal-auth
//!
//! Client-side session and token lifecycle for the portal.
//!
//! ## Modules
//!
//! - `jwt`: bearer credential claims decoding and expiry checks (no signature verification)
//! - `session`: credential store, session context, and the renewal coordinator
//! - `rbac`: route permission gate and navigation scoping

pub mod jwt;
pub mod rbac;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use jwt::{Claims, TokenType};
pub use rbac::{
    DecisionSource, NavigationGuard, NavigationVerdict, PermissionDecision, RoutePermissionGate,
    RoutePolicy,
};
pub use session::{
    CoordinatorState, CredentialPair, CredentialStore, RenewalCoordinator, RenewalOutcome,
    SessionManager,
};
