//! In-memory credential storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use portal_core::result::AppResult;
use portal_core::traits::CredentialStorage;

/// Process-local storage. Contents are lost when the process exits.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStorage {
    /// Stored entries; a single lock makes batches atomic.
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryCredentialStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStorage for MemoryCredentialStorage {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn get_many(&self, keys: &[&str]) -> AppResult<Vec<Option<String>>> {
        let entries = self.entries.read().await;
        Ok(keys.iter().map(|k| entries.get(*k).cloned()).collect())
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> AppResult<()> {
        let mut guard = self.entries.write().await;
        for (key, value) in entries {
            guard.insert((*key).to_string(), value.clone());
        }
        debug!(count = entries.len(), "Stored entries in memory");
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> AppResult<()> {
        let mut guard = self.entries.write().await;
        for key in keys {
            guard.remove(*key);
        }
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
