//! Storage manager that dispatches to the configured provider.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use portal_core::config::StorageConfig;
use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_core::traits::CredentialStorage;

/// Wraps the configured credential storage provider.
#[derive(Debug, Clone)]
pub struct StorageManager {
    /// The inner storage provider.
    inner: Arc<dyn CredentialStorage>,
}

impl StorageManager {
    /// Create a storage manager from configuration.
    pub async fn new(config: &StorageConfig) -> AppResult<Self> {
        let inner: Arc<dyn CredentialStorage> = match config.provider.as_str() {
            #[cfg(feature = "file")]
            "file" => {
                info!(path = %config.path, "Initializing file credential storage");
                Arc::new(crate::file::FileCredentialStorage::open(&config.path).await?)
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory credential storage");
                Arc::new(crate::memory::MemoryCredentialStorage::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown storage provider: '{other}'. Supported: file, memory"
                )));
            }
        };

        Ok(Self { inner })
    }
}

#[async_trait]
impl CredentialStorage for StorageManager {
    fn provider_type(&self) -> &str {
        self.inner.provider_type()
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn get_many(&self, keys: &[&str]) -> AppResult<Vec<Option<String>>> {
        self.inner.get_many(keys).await
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> AppResult<()> {
        self.inner.set_many(entries).await
    }

    async fn remove_many(&self, keys: &[&str]) -> AppResult<()> {
        self.inner.remove_many(keys).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
