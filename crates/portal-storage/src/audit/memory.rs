//! Bounded in-memory audit sink.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use portal_core::traits::AuditSink;
use portal_core::types::AuditEntry;

/// Keeps the most recent `capacity` records in memory.
#[derive(Debug, Clone)]
pub struct MemoryAuditSink {
    /// Retained records, oldest first.
    entries: Arc<Mutex<VecDeque<AuditEntry>>>,
    /// Maximum number of retained records.
    capacity: usize,
}

impl MemoryAuditSink {
    /// Create a sink retaining at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(1024)))),
            capacity: capacity.max(1),
        }
    }

    /// Snapshot of the retained records, oldest first.
    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().await.iter().cloned().collect()
    }

    /// Number of retained records.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether nothing has been recorded.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl Default for MemoryAuditSink {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, entry: AuditEntry) {
        let mut entries = self.entries.lock().await;
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }
}
