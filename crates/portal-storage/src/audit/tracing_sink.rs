//! Audit sink that emits records as `tracing` events.

use async_trait::async_trait;

use portal_core::traits::AuditSink;
use portal_core::types::{AuditEntry, AuditLevel};

/// Writes audit records to the `audit` tracing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, entry: AuditEntry) {
        let user_id = entry.user_id.as_deref().unwrap_or("-");
        let route_path = entry.route_path.as_deref().unwrap_or("-");
        match entry.level {
            AuditLevel::Debug => tracing::debug!(
                target: "audit",
                context = %entry.context,
                user_id,
                route_path,
                granted = ?entry.granted,
                "{}",
                entry.message
            ),
            AuditLevel::Info => tracing::info!(
                target: "audit",
                context = %entry.context,
                user_id,
                route_path,
                granted = ?entry.granted,
                "{}",
                entry.message
            ),
            AuditLevel::Warn => tracing::warn!(
                target: "audit",
                context = %entry.context,
                user_id,
                route_path,
                granted = ?entry.granted,
                "{}",
                entry.message
            ),
            AuditLevel::Error => tracing::error!(
                target: "audit",
                context = %entry.context,
                user_id,
                route_path,
                granted = ?entry.granted,
                "{}",
                entry.message
            ),
        }
    }
}
