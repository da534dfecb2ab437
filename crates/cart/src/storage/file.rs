//! File-backed storage backend.
//!
//! All slots live in one JSON object on disk (`{"key": "blob", ...}`). Every
//! `set` rewrites the whole document through a temporary sibling file and a
//! rename, so a crash mid-write leaves the previous document in place.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::CartStorage;
use crate::error::StorageError;

/// Key-value storage persisted as a JSON document.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles on the document.
    lock: Mutex<()>,
}

impl FileStorage {
    /// Use the document at `path`. The file is created on the first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<HashMap<String, String>, StorageError> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(HashMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document(&self, document: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(document)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CartStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        Ok(document.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut document = match self.read_document().await {
            Ok(document) => document,
            Err(StorageError::Corrupt(e)) => {
                warn!(path = %self.path.display(), error = %e, "Replacing corrupt storage file");
                HashMap::new()
            }
            Err(e) => return Err(e),
        };

        document.insert(key.to_owned(), value);
        self.write_document(&document).await?;
        debug!(path = %self.path.display(), key, "Storage slot written");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("gm_file_storage_{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let storage = FileStorage::new(temp_path("storage.json"));
        assert_eq!(storage.get("@GoMarketplace:cart").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_creates_file_and_persists() {
        let path = temp_path("storage.json");
        let storage = FileStorage::new(&path);
        storage.set("a", "[1]".to_string()).await.unwrap();
        storage.set("b", "[2]".to_string()).await.unwrap();

        // A fresh handle sees both slots
        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get("a").await.unwrap().as_deref(), Some("[1]"));
        assert_eq!(reopened.get("b").await.unwrap().as_deref(), Some("[2]"));
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_errors_on_read_and_is_replaced_on_write() {
        let path = temp_path("storage.json");
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        fs::write(&path, b"not json").await.unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.get("k").await,
            Err(StorageError::Corrupt(_))
        ));

        storage.set("k", "v".to_string()).await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
