//! Audit sink configuration.

use serde::{Deserialize, Serialize};

/// Audit sink settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Sink type: `"tracing"`, `"jsonl"`, or `"memory"`.
    #[serde(default = "default_sink")]
    pub sink: String,
    /// Path of the append-only JSON-lines file used by the `jsonl` sink.
    #[serde(default = "default_path")]
    pub path: String,
    /// Number of entries retained by the `memory` sink.
    #[serde(default = "default_capacity")]
    pub memory_capacity: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            sink: default_sink(),
            path: default_path(),
            memory_capacity: default_capacity(),
        }
    }
}

fn default_sink() -> String {
    "tracing".to_string()
}

fn default_path() -> String {
    "data/audit.jsonl".to_string()
}

fn default_capacity() -> usize {
    1000
}
