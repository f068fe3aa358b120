//! Audit log records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditLevel {
    /// Debug detail.
    Debug,
    /// Normal event (access granted, session renewed).
    Info,
    /// Noteworthy event (access denied, recovered failure).
    Warn,
    /// Failure.
    Error,
}

impl fmt::Display for AuditLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One append-only audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Severity.
    pub level: AuditLevel,
    /// Short description.
    pub message: String,
    /// Subsystem that wrote the record (`route_permission`, `session`).
    pub context: String,
    /// Principal the record is about.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Role of the principal.
    #[serde(default)]
    pub user_role: Option<String>,
    /// Route the record is about.
    #[serde(default)]
    pub route_path: Option<String>,
    /// Permission verdict, for route permission records.
    #[serde(default)]
    pub granted: Option<bool>,
    /// When the record was written.
    pub timestamp: DateTime<Utc>,
    /// Extra structured detail.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl AuditEntry {
    /// Starts a record stamped with the current time.
    pub fn new(level: AuditLevel, message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            context: context.into(),
            user_id: None,
            user_role: None,
            route_path: None,
            granted: None,
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }

    /// Sets the principal fields.
    pub fn with_user(mut self, user_id: impl Into<String>, role: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self.user_role = Some(role.into());
        self
    }

    /// Sets the route the record is about.
    pub fn with_route(mut self, route_path: impl Into<String>) -> Self {
        self.route_path = Some(route_path.into());
        self
    }

    /// Sets the permission verdict.
    pub fn with_granted(mut self, granted: bool) -> Self {
        self.granted = Some(granted);
        self
    }

    /// Sets the metadata payload.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}
