//! Bearer credential decoding and expiry checks.
//!
//! Tokens are read, never verified: the server is the only party that
//! validates signatures.

pub mod claims;
pub mod codec;

pub use claims::{Claims, TokenType};
pub use codec::{decode, is_expired, is_expiring_soon, time_remaining};
