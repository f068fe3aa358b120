//! Credential store: the single source of truth for the current pair and
//! the user it belongs to.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use portal_core::result::AppResult;
use portal_core::traits::CredentialStorage;
use portal_core::types::Principal;
use portal_storage::CredentialKeys;

use super::credentials::CredentialPair;

/// Holds the current credential pair and principal, mirrored to durable
/// storage.
///
/// Readers see the in-memory snapshot. Writers hold the write lock across
/// the storage batch and the snapshot swap, so no reader can observe a
/// pair assembled from two different writes. When both locks are needed,
/// `current` is taken before `principal`.
#[derive(Debug)]
pub struct CredentialStore {
    /// Durable key-value storage.
    storage: Arc<dyn CredentialStorage>,
    /// Storage key names.
    keys: CredentialKeys,
    /// Current pair, `None` when logged out.
    current: RwLock<Option<CredentialPair>>,
    /// Cached user of the current pair.
    principal: RwLock<Option<Principal>>,
}

impl CredentialStore {
    /// Loads the persisted pair from `storage`.
    ///
    /// A partially persisted pair (any of the four fields missing or
    /// unparseable) is treated as no session and its leftovers are removed,
    /// cached user included. An unreadable cached user is dropped on its own.
    pub async fn load(storage: Arc<dyn CredentialStorage>, key_prefix: &str) -> AppResult<Self> {
        let keys = CredentialKeys::with_prefix(key_prefix);
        let values = storage.get_many(&keys.all()).await?;

        let current = match values.as_slice() {
            [Some(access), Some(refresh), Some(access_exp), Some(refresh_exp), _] => {
                match (access_exp.parse::<i64>(), refresh_exp.parse::<i64>()) {
                    (Ok(access_expires_at), Ok(refresh_expires_at))
                        if !access.is_empty() && !refresh.is_empty() =>
                    {
                        Some(CredentialPair {
                            access_token: access.clone(),
                            refresh_token: refresh.clone(),
                            access_expires_at,
                            refresh_expires_at,
                        })
                    }
                    _ => None,
                }
            }
            _ => None,
        };

        if current.is_none() && values.iter().any(Option::is_some) {
            warn!(
                provider = storage.provider_type(),
                "Discarding incomplete persisted credentials"
            );
            storage.remove_many(&keys.all()).await?;
        }

        let principal = match (&current, values.get(4)) {
            (Some(_), Some(Some(json))) => match serde_json::from_str::<Principal>(json) {
                Ok(principal) => Some(principal),
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable cached user");
                    storage.remove_many(&[keys.user.as_str()]).await?;
                    None
                }
            },
            _ => None,
        };

        debug!(
            provider = storage.provider_type(),
            has_credentials = current.is_some(),
            has_principal = principal.is_some(),
            "Credential store loaded"
        );

        Ok(Self {
            storage,
            keys,
            current: RwLock::new(current),
            principal: RwLock::new(principal),
        })
    }

    /// Whether a credential pair is held.
    pub async fn has_credentials(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Snapshot of the current pair.
    pub async fn get(&self) -> Option<CredentialPair> {
        self.current.read().await.clone()
    }

    /// Replaces the pair.
    ///
    /// The in-memory pair is replaced even when persisting fails; the error
    /// is returned so the caller can log it.
    pub async fn set(&self, pair: CredentialPair) -> AppResult<()> {
        let mut current = self.current.write().await;
        let persisted = self.persist(&pair).await;
        *current = Some(pair);
        persisted
    }

    /// Replaces the pair only if the stored refresh token is still
    /// `expected_refresh`. Returns `false` (and writes nothing) when the
    /// pair was cleared or rotated in the meantime.
    pub async fn replace_if(
        &self,
        expected_refresh: &str,
        pair: CredentialPair,
    ) -> AppResult<bool> {
        let mut current = self.current.write().await;
        match current.as_ref() {
            Some(existing) if existing.refresh_token == expected_refresh => {}
            _ => return Ok(false),
        }
        let persisted = self.persist(&pair).await;
        *current = Some(pair);
        persisted.map(|_| true)
    }

    /// Cached user of the current session.
    pub async fn principal(&self) -> Option<Principal> {
        self.principal.read().await.clone()
    }

    /// Replaces the cached user, persisting it as JSON (or removing it for
    /// `None`). The in-memory value is replaced even when persisting fails.
    pub async fn set_principal(&self, principal: Option<Principal>) -> AppResult<()> {
        let mut cached = self.principal.write().await;
        let persisted = match &principal {
            Some(p) => match serde_json::to_string(p) {
                Ok(json) => {
                    self.storage
                        .set_many(&[(self.keys.user.as_str(), json)])
                        .await
                }
                Err(e) => Err(e.into()),
            },
            None => self.storage.remove_many(&[self.keys.user.as_str()]).await,
        };
        *cached = principal;
        persisted
    }

    /// Removes the pair and the cached user together.
    pub async fn clear(&self) -> AppResult<()> {
        let mut current = self.current.write().await;
        let mut principal = self.principal.write().await;
        *current = None;
        *principal = None;
        self.storage.remove_many(&self.keys.all()).await
    }

    /// Storage provider identifier.
    pub fn provider_type(&self) -> &str {
        self.storage.provider_type()
    }

    async fn persist(&self, pair: &CredentialPair) -> AppResult<()> {
        self.storage
            .set_many(&[
                (self.keys.access_token.as_str(), pair.access_token.clone()),
                (self.keys.refresh_token.as_str(), pair.refresh_token.clone()),
                (
                    self.keys.access_expires_at.as_str(),
                    pair.access_expires_at.to_string(),
                ),
                (
                    self.keys.refresh_expires_at.as_str(),
                    pair.refresh_expires_at.to_string(),
                ),
            ])
            .await
    }
}
