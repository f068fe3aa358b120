//! File-backed credential storage.
//!
//! The whole key-value map lives in one JSON document. Every mutation writes
//! the complete document to a sibling temp file and renames it over the
//! previous one, so the file on disk always holds either the old or the new map.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_core::traits::CredentialStorage;

/// Storage persisted as a JSON object on the local filesystem.
#[derive(Debug)]
pub struct FileCredentialStorage {
    /// Path of the JSON document.
    path: PathBuf,
    /// In-memory copy of the document; the lock also serializes writers.
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileCredentialStorage {
    /// Open (or create) the storage document at `path`.
    ///
    /// An unreadable or corrupt document is treated as empty; the next write
    /// replaces it.
    pub async fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create storage directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        let entries = match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, String>>(&bytes) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Corrupt storage document, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read storage document: {}", path.display()),
                    e,
                ));
            }
        };

        debug!(path = %path.display(), keys = entries.len(), "Opened file storage");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `map` to disk via temp file + rename.
    async fn persist(&self, map: &BTreeMap<String, String>) -> AppResult<()> {
        let bytes = serde_json::to_vec_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");

        fs::write(&tmp, &bytes).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write storage document: {}", tmp.display()),
                e,
            )
        })?;

        fs::rename(&tmp, &self.path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to replace storage document: {}", self.path.display()),
                e,
            )
        })
    }
}

#[async_trait]
impl CredentialStorage for FileCredentialStorage {
    fn provider_type(&self) -> &str {
        "file"
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn get_many(&self, keys: &[&str]) -> AppResult<Vec<Option<String>>> {
        let entries = self.entries.lock().await;
        Ok(keys.iter().map(|k| entries.get(*k).cloned()).collect())
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> AppResult<()> {
        let mut guard = self.entries.lock().await;
        let mut next = guard.clone();
        for (key, value) in entries {
            next.insert((*key).to_string(), value.clone());
        }
        // Memory only changes once the disk holds the new document.
        self.persist(&next).await?;
        *guard = next;
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> AppResult<()> {
        let mut guard = self.entries.lock().await;
        if !keys.iter().any(|k| guard.contains_key(*k)) {
            return Ok(());
        }
        let mut next = guard.clone();
        for key in keys {
            next.remove(*key);
        }
        self.persist(&next).await?;
        *guard = next;
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self
            .path
            .parent()
            .map(|p| p.as_os_str().is_empty() || p.is_dir())
            .unwrap_or(true))
    }
}
