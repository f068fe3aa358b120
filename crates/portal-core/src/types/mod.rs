//! Shared domain types used across crates.

pub mod audit;
pub mod principal;
pub mod role;
pub mod token;

pub use audit::{AuditEntry, AuditLevel};
pub use principal::Principal;
pub use role::UserRole;
pub use token::TokenPair;
