//! # portal-client
//!
//! `reqwest` implementation of the remote endpoints the session subsystem
//! consumes: token renewal, logout, and the route permission lookup.

pub mod client;
pub mod wire;

pub use client::HttpAuthClient;
