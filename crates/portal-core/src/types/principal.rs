//! The authenticated user a session belongs to.

use serde::{Deserialize, Serialize};

use super::role::UserRole;

/// The principal behind the current session, as reported by the user
/// profile endpoint at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User ID.
    pub id: String,
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// Assigned role.
    pub role: UserRole,
    /// Superuser flag, independent of the role.
    #[serde(default)]
    pub is_superuser: bool,
}

impl Principal {
    /// Creates a principal with no superuser flag.
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role,
            is_superuser: false,
        }
    }
}
