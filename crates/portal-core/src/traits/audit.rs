//! Write-only audit sink.

use async_trait::async_trait;

use crate::types::AuditEntry;

/// Append-only destination for permission decisions and session events.
///
/// Recording never fails from the caller's perspective; sinks log their own
/// write failures.
#[async_trait]
pub trait AuditSink: Send + Sync + std::fmt::Debug + 'static {
    /// Append one record.
    async fn record(&self, entry: AuditEntry);
}
