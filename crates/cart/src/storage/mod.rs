//! Persistence collaborator for cart snapshots.
//!
//! The store only needs a string-keyed slot it can read once at startup and
//! overwrite after every mutation. Two backends ship with the crate:
//!
//! - [`MemoryStorage`] - process-local map, for tests and throwaway sessions
//! - [`FileStorage`] - JSON document on disk, for the CLI and on-device use

mod file;
mod memory;

use async_trait::async_trait;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::StorageError;

/// Storage key under which the cart snapshot lives.
pub const CART_STORAGE_KEY: &str = "@GoMarketplace:cart";

/// A key-value store holding serialized blobs.
#[async_trait]
pub trait CartStorage: Send + Sync {
    /// Read the blob stored under `key`, or `None` if the slot is empty.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the blob stored under `key`.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}
