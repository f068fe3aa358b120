//! Session lifecycle: the persisted credential pair, the session context
//! exposed to the application, and proactive token renewal.

pub mod credentials;
pub mod manager;
pub mod renewal;
pub mod store;

pub use credentials::CredentialPair;
pub use manager::SessionManager;
pub use renewal::{CoordinatorState, RenewalCoordinator, RenewalOutcome};
pub use store::CredentialStore;
