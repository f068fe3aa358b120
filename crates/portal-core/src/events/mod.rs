//! Domain events broadcast to the rest of the application.

pub mod session;

pub use session::{ClearReason, SessionEvent};
