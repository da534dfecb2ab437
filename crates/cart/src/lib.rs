//! GoMarketplace Cart - Persistent shopping-cart store.
//!
//! Tracks the products a shopper has picked, with quantities, and keeps an
//! on-device copy so the cart survives restarts.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the cart. Mutations apply to memory immediately and
//!   queue a full snapshot write; the caller never blocks on storage.
//! - A per-store persistence worker restores the stored snapshot at startup
//!   and performs the queued writes in order.
//! - [`CartStorage`] is the key-value collaborator the snapshot lives in
//!   ([`MemoryStorage`], [`FileStorage`]).
//! - [`CartProvider`] / [`use_cart`] give scoped access to a store without
//!   passing the handle around.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use go_marketplace_cart::{CartStore, FileStorage};
//! use go_marketplace_core::NewLineItem;
//! use rust_decimal::Decimal;
//!
//! # async fn demo() -> Result<(), go_marketplace_cart::CartError> {
//! let store = CartStore::open(Arc::new(FileStorage::new("cart.json")));
//! store.ready().await;
//!
//! store
//!     .add_to_cart(NewLineItem::new("p1", "Mug", "https://cdn/mug.png", Decimal::new(1250, 2)))
//!     .wait()
//!     .await?;
//! assert_eq!(store.products().item_count(), 1);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
mod persistence;
pub mod provider;
pub mod storage;
pub mod store;

pub use error::{CartError, StorageError};
pub use persistence::PersistenceEvent;
pub use provider::{CartProvider, use_cart};
pub use storage::{CART_STORAGE_KEY, CartStorage, FileStorage, MemoryStorage};
pub use store::{CartStore, PendingWrite};
