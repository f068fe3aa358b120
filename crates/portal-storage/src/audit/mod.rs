//! Append-only audit sinks.

pub mod jsonl;
pub mod memory;
pub mod tracing_sink;

use std::sync::Arc;

use portal_core::config::AuditConfig;
use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_core::traits::AuditSink;

pub use jsonl::JsonlAuditSink;
pub use memory::MemoryAuditSink;
pub use tracing_sink::TracingAuditSink;

/// Build the audit sink selected by configuration.
pub async fn build_audit_sink(config: &AuditConfig) -> AppResult<Arc<dyn AuditSink>> {
    match config.sink.as_str() {
        "tracing" => Ok(Arc::new(TracingAuditSink)),
        "jsonl" => Ok(Arc::new(JsonlAuditSink::open(&config.path).await?)),
        "memory" => Ok(Arc::new(MemoryAuditSink::new(config.memory_capacity))),
        other => Err(AppError::configuration(format!(
            "Unknown audit sink: '{other}'. Supported: tracing, jsonl, memory"
        ))),
    }
}
