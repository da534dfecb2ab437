//! Error types for the cart store and its storage collaborator.

use thiserror::Error;

/// Errors raised by a [`CartStorage`](crate::storage::CartStorage) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but is not a valid key-value document.
    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The backend cannot serve requests right now.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the cart store.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart was accessed outside a [`CartProvider`](crate::CartProvider) scope.
    #[error("use_cart must be used within a CartProvider")]
    NoProvider,

    /// The storage collaborator rejected a read or write.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart snapshot could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The persistence worker exited before acknowledging a write.
    #[error("cart persistence worker has stopped")]
    WorkerStopped,
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
