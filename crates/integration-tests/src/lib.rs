//! Integration tests for GoMarketplace.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p go-marketplace-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Store + `FileStorage` across restarts
//! - `cart_provider` - Scoped access from nested async code
//!
//! Tests only touch the filesystem under the OS temp directory, one unique
//! directory per test.

use std::path::PathBuf;

use go_marketplace_core::NewLineItem;
use rust_decimal::Decimal;

/// A storage document path in a fresh temp directory.
#[must_use]
pub fn temp_storage_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("gm_integration_{}", uuid::Uuid::new_v4()))
        .join("storage.json")
}

/// A catalog product for tests.
#[must_use]
pub fn product(id: &str, title: &str, cents: i64) -> NewLineItem {
    NewLineItem::new(
        id,
        title,
        format!("https://cdn.example/{id}.png"),
        Decimal::new(cents, 2),
    )
}
