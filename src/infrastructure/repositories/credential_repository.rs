use crate::domain::tts::ProviderId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tokio::sync::{Mutex, RwLock};

/// Persisted state of one provider's credential pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub cursor: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialStoreError {
    #[error("credential store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("credential store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Storage for credential lists and rotation cursors.
///
/// Implementations only persist; trimming and range checks belong to the
/// pool.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn load(&self, provider: ProviderId)
        -> Result<Option<StoredCredentials>, CredentialStoreError>;

    async fn save_keys(
        &self,
        provider: ProviderId,
        keys: &[String],
        cursor: usize,
    ) -> Result<(), CredentialStoreError>;

    async fn save_cursor(&self, provider: ProviderId, cursor: usize)
        -> Result<(), CredentialStoreError>;
}

/// Process-local store, lost on restart
#[derive(Default)]
pub struct InMemoryCredentialRepository {
    entries: RwLock<HashMap<ProviderId, StoredCredentials>>,
}

impl InMemoryCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn load(
        &self,
        provider: ProviderId,
    ) -> Result<Option<StoredCredentials>, CredentialStoreError> {
        Ok(self.entries.read().await.get(&provider).cloned())
    }

    async fn save_keys(
        &self,
        provider: ProviderId,
        keys: &[String],
        cursor: usize,
    ) -> Result<(), CredentialStoreError> {
        self.entries.write().await.insert(
            provider,
            StoredCredentials {
                keys: keys.to_vec(),
                cursor,
            },
        );
        Ok(())
    }

    async fn save_cursor(
        &self,
        provider: ProviderId,
        cursor: usize,
    ) -> Result<(), CredentialStoreError> {
        self.entries
            .write()
            .await
            .entry(provider)
            .or_default()
            .cursor = cursor;
        Ok(())
    }
}

/// JSON file store: `{ "gemini": { "keys": [...], "cursor": 1 }, ... }`
pub struct FileCredentialRepository {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file
    lock: Mutex<()>,
}

type StoreFile = BTreeMap<String, StoredCredentials>;

impl FileCredentialRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_file(&self) -> Result<StoreFile, CredentialStoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(StoreFile::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(StoreFile::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_file(&self, contents: &StoreFile) -> Result<(), CredentialStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(contents)?;

        // Write then rename so a crash never leaves a half-written store
        let staging = self.path.with_extension("tmp");
        tokio::fs::write(&staging, bytes).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialRepository for FileCredentialRepository {
    async fn load(
        &self,
        provider: ProviderId,
    ) -> Result<Option<StoredCredentials>, CredentialStoreError> {
        let _guard = self.lock.lock().await;
        let mut contents = self.read_file().await?;
        Ok(contents.remove(provider.as_str()))
    }

    async fn save_keys(
        &self,
        provider: ProviderId,
        keys: &[String],
        cursor: usize,
    ) -> Result<(), CredentialStoreError> {
        let _guard = self.lock.lock().await;
        let mut contents = self.read_file().await?;
        contents.insert(
            provider.as_str().to_string(),
            StoredCredentials {
                keys: keys.to_vec(),
                cursor,
            },
        );
        self.write_file(&contents).await
    }

    async fn save_cursor(
        &self,
        provider: ProviderId,
        cursor: usize,
    ) -> Result<(), CredentialStoreError> {
        let _guard = self.lock.lock().await;
        let mut contents = self.read_file().await?;
        contents
            .entry(provider.as_str().to_string())
            .or_default()
            .cursor = cursor;
        self.write_file(&contents).await
    }
}
