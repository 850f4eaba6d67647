use super::PoolStatus;
use crate::domain::tts::ProviderId;
use crate::infrastructure::repositories::{CredentialRepository, CredentialStoreError};
use std::sync::Arc;
use tokio::sync::watch;

/// Ordered API keys for one provider, cycled round-robin.
///
/// The cursor names the key the next chunk starts with. It only moves on
/// success, to the slot after the key that worked, and every move is
/// persisted through the repository.
pub struct CredentialPool {
    provider: ProviderId,
    keys: Vec<String>,
    /// Used as a one-key pool when no keys are configured
    fallback: Option<String>,
    cursor: usize,
    repository: Arc<dyn CredentialRepository>,
    /// Latest status, readable without locking the pool
    status: watch::Sender<PoolStatus>,
}

impl CredentialPool {
    pub fn new(
        provider: ProviderId,
        keys: Vec<String>,
        fallback: Option<String>,
        repository: Arc<dyn CredentialRepository>,
    ) -> Self {
        let (status, _) = watch::channel(PoolStatus::empty(provider));
        let pool = Self {
            provider,
            keys: sanitize_keys(keys),
            fallback: fallback
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            cursor: 0,
            repository,
            status,
        };
        pool.publish();
        pool
    }

    /// Restore a pool from the repository; stored keys win over the seed
    pub async fn load(
        provider: ProviderId,
        seed_keys: Vec<String>,
        fallback: Option<String>,
        repository: Arc<dyn CredentialRepository>,
    ) -> Result<Self, CredentialStoreError> {
        let stored = repository.load(provider).await?.unwrap_or_default();
        let stored_keys = sanitize_keys(stored.keys);

        let keys = if stored_keys.is_empty() {
            seed_keys
        } else {
            stored_keys
        };

        let mut pool = Self::new(provider, keys, fallback, repository);
        pool.cursor = stored.cursor;
        pool.publish();

        tracing::info!(
            provider = %provider,
            key_count = pool.keys.len(),
            uses_fallback = pool.uses_fallback(),
            cursor = pool.cursor(),
            "Credential pool loaded"
        );

        Ok(pool)
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    /// Number of usable keys, counting the fallback
    pub fn size(&self) -> usize {
        if !self.keys.is_empty() {
            self.keys.len()
        } else if self.fallback.is_some() {
            1
        } else {
            0
        }
    }

    pub fn is_configured(&self) -> bool {
        self.size() > 0
    }

    pub fn uses_fallback(&self) -> bool {
        self.keys.is_empty() && self.fallback.is_some()
    }

    /// Cursor clamped into range; a stale cursor past the end reads as 0
    pub fn cursor(&self) -> usize {
        if self.cursor < self.size() {
            self.cursor
        } else {
            0
        }
    }

    fn key(&self, index: usize) -> Option<&str> {
        if self.keys.is_empty() {
            return if index == 0 {
                self.fallback.as_deref()
            } else {
                None
            };
        }
        self.keys.get(index).map(String::as_str)
    }

    /// Key at the cursor, without moving it
    pub fn current(&self) -> Option<(usize, &str)> {
        self.key_at(0)
    }

    /// Key `offset` slots after the cursor, wrapping around
    pub fn key_at(&self, offset: usize) -> Option<(usize, &str)> {
        let size = self.size();
        if size == 0 {
            return None;
        }
        let index = (self.cursor() + offset) % size;
        self.key(index).map(|key| (index, key))
    }

    /// Record a success with the key at `succeeded_index`
    pub async fn advance(&mut self, succeeded_index: usize) {
        let size = self.size();
        if size == 0 {
            return;
        }
        self.cursor = (succeeded_index + 1) % size;
        self.publish();

        if let Err(err) = self
            .repository
            .save_cursor(self.provider, self.cursor)
            .await
        {
            // Rotation still works in memory for this process
            tracing::warn!(
                provider = %self.provider,
                cursor = self.cursor,
                error = %err,
                "Failed to persist credential cursor"
            );
        }
    }

    /// Replace the configured keys; returns the number kept after trimming
    pub async fn replace_keys(&mut self, keys: Vec<String>) -> Result<usize, CredentialStoreError> {
        let keys = sanitize_keys(keys);
        let cursor = if self.cursor < keys.len() {
            self.cursor
        } else {
            0
        };

        self.repository
            .save_keys(self.provider, &keys, cursor)
            .await?;

        self.keys = keys;
        self.cursor = cursor;
        self.publish();

        tracing::info!(
            provider = %self.provider,
            key_count = self.keys.len(),
            "Credential keys replaced"
        );

        Ok(self.keys.len())
    }

    /// Receiver that always holds the latest status
    pub fn subscribe(&self) -> watch::Receiver<PoolStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            provider: self.provider,
            configured: self.is_configured(),
            key_count: self.size(),
            cursor: self.cursor(),
            uses_fallback: self.uses_fallback(),
            masked_keys: self.masked_keys(),
        }
    }

    fn publish(&self) {
        self.status.send_replace(self.status());
    }

    /// Masked keys in pool order, for display
    pub fn masked_keys(&self) -> Vec<String> {
        (0..self.size())
            .filter_map(|index| self.key(index))
            .map(mask_key)
            .collect()
    }
}

fn sanitize_keys(keys: Vec<String>) -> Vec<String> {
    keys.into_iter()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .collect()
}

/// Short form safe for logs and responses: `sk_…abcd`
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return format!("…{}", "*".repeat(chars.len().min(4)));
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}
