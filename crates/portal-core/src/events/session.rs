//! Session lifecycle events.

use serde::{Deserialize, Serialize};

/// Why a session was cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearReason {
    /// The user logged out.
    Logout,
    /// The refresh token reached its expiry.
    RefreshExpired,
    /// The HTTP layer saw the session rejected and revoked it.
    Revoked,
}

/// Events related to the client session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A credential pair was seeded from outside (login, OAuth callback).
    Established {
        /// The principal's user ID, when known.
        user_id: Option<String>,
    },
    /// The renewal coordinator replaced the credential pair.
    Renewed {
        /// New access expiry, epoch milliseconds.
        access_expires_at: i64,
    },
    /// The session was cleared; the router should send the user to login.
    Cleared {
        /// Why.
        reason: ClearReason,
    },
}

impl SessionEvent {
    /// Whether this event ends the session.
    pub fn is_cleared(&self) -> bool {
        matches!(self, Self::Cleared { .. })
    }
}
