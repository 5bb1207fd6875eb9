//! Durable client-side storage for the cart and the login session.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Keys may only contain ASCII letters, digits, `-` and `_`.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Key/value store for JSON documents.
///
/// The storefront keeps one document per well-known key (`"cart"`,
/// `"user"`). All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Returns the document stored under `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<String>>;

    /// Stores `document` under `key`, replacing any previous value.
    async fn save(&self, key: &str, document: String) -> Result<()>;

    /// Removes the document under `key`. Missing keys are not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Extension trait providing typed JSON access to a storage.
#[async_trait]
pub trait ClientStorageExt: ClientStorage {
    /// Loads and deserializes the document under `key`.
    async fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.load(key).await? {
            Some(document) => Ok(Some(serde_json::from_str(&document)?)),
            None => Ok(None),
        }
    }

    /// Serializes `value` and stores it under `key`.
    async fn save_json<T: Serialize + Sync + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let document = serde_json::to_string(value)?;
        self.save(key, document).await
    }
}

// Blanket implementation for all ClientStorage implementations
impl<T: ClientStorage + ?Sized> ClientStorageExt for T {}

/// In-memory storage for tests and ephemeral sessions.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    documents: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a document is stored under `key`.
    pub async fn contains(&self, key: &str) -> bool {
        self.documents.read().await.contains_key(key)
    }
}

#[async_trait]
impl ClientStorage for InMemoryStorage {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, document: String) -> Result<()> {
        self.documents
            .write()
            .await
            .insert(key.to_string(), document);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.documents.write().await.remove(key);
        Ok(())
    }
}

/// File-backed storage: one `<key>.json` file per key in a directory.
///
/// Writes go to a temporary file that is then renamed over the target.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates a storage rooted at `dir`. The directory is created on the
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl ClientStorage for FileStorage {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(document) => Ok(Some(document)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, key: &str, document: String) -> Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        tokio::fs::write(&tmp, document).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
