//! # portal-storage
//!
//! Persisted storage for the session subsystem:
//!
//! - **memory**: process-local map, for tests and ephemeral sessions
//! - **file**: a JSON document replaced atomically on every write, so the
//!   credential pair survives a restart
//!
//! Also hosts the append-only audit sinks (`tracing`, `jsonl`, `memory`).
//! Providers are selected at runtime based on configuration.

pub mod audit;
#[cfg(feature = "file")]
pub mod file;
pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;

pub use keys::CredentialKeys;
pub use provider::StorageManager;
