//! Persisted key-value storage trait for the credential pair.

use async_trait::async_trait;

use crate::result::AppResult;

/// Durable string key-value storage that survives a process restart.
///
/// Values are plain strings. Batch operations must be all-or-nothing: a
/// reader of the backing medium never observes half of a `set_many` or
/// `remove_many`.
#[async_trait]
pub trait CredentialStorage: Send + Sync + std::fmt::Debug + 'static {
    /// Short provider identifier (`"memory"`, `"file"`).
    fn provider_type(&self) -> &str;

    /// Get a value by key. Returns `None` if the key does not exist.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Get several values in one consistent read.
    async fn get_many(&self, keys: &[&str]) -> AppResult<Vec<Option<String>>>;

    /// Write several entries atomically.
    async fn set_many(&self, entries: &[(&str, String)]) -> AppResult<()>;

    /// Remove several keys atomically. Missing keys are ignored.
    async fn remove_many(&self, keys: &[&str]) -> AppResult<()>;

    /// Check that the backing medium is usable.
    async fn health_check(&self) -> AppResult<bool>;
}
