//! # portal-core
//!
//! Core crate for the portal session subsystem. Contains the collaborator
//! traits, configuration schemas, domain types, session events, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other portal crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
