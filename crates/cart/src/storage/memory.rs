//! In-process storage backend.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::CartStorage;
use crate::error::StorageError;

/// Key-value storage kept in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with one slot already filled.
    #[must_use]
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut data = HashMap::new();
        data.insert(key.into(), value.into());
        Self {
            data: RwLock::new(data),
        }
    }
}

#[async_trait]
impl CartStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.data.write().await.insert(key.to_owned(), value);
        Ok(())
    }
}
