//! Collaborator traits defined in `portal-core` and implemented by other crates.

pub mod audit;
pub mod remote;
pub mod storage;

pub use audit::AuditSink;
pub use remote::{AccessTokenSource, PermissionLookup, RenewalEndpoint};
pub use storage::CredentialStorage;
