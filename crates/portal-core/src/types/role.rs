//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles known to the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Portal administrator.
    Admin,
    /// Unrestricted operator account.
    Superuser,
    /// Lawyer working case files.
    Lawyer,
    /// Sales/intake agent.
    Agent,
    /// Plain registered user.
    User,
}

impl UserRole {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Superuser => "superuser",
            Self::Lawyer => "lawyer",
            Self::Agent => "agent",
            Self::User => "user",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = crate::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "superuser" => Ok(Self::Superuser),
            "lawyer" => Ok(Self::Lawyer),
            "agent" => Ok(Self::Agent),
            "user" => Ok(Self::User),
            _ => Err(crate::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, superuser, lawyer, agent, user"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("LAWYER".parse::<UserRole>().unwrap(), UserRole::Lawyer);
        assert!("viewer".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&UserRole::Superuser).unwrap();
        assert_eq!(json, "\"superuser\"");
        let role: UserRole = serde_json::from_str("\"agent\"").unwrap();
        assert_eq!(role, UserRole::Agent);
    }
}
