//! Integration tests for cart persistence through `FileStorage`.
//!
//! These tests open a store over a real JSON document, mutate it, then open a
//! second store over the same file to check what a restarted app would see.

use std::sync::Arc;

use go_marketplace_cart::{CART_STORAGE_KEY, CartStorage, CartStore, FileStorage};
use go_marketplace_core::{Cart, ProductId};
use go_marketplace_integration_tests::{product, temp_storage_path};
use rust_decimal::Decimal;

async fn open(path: &std::path::Path) -> CartStore {
    let store = CartStore::open(Arc::new(FileStorage::new(path)));
    store.ready().await;
    store
}

// =============================================================================
// Restore
// =============================================================================

#[tokio::test]
async fn test_fresh_install_has_empty_cart() {
    let path = temp_storage_path();
    let store = open(&path).await;

    assert!(store.products().is_empty());
    assert!(!path.exists(), "restoring must not write anything");
}

#[tokio::test]
async fn test_cart_survives_restart() {
    let path = temp_storage_path();

    let store = open(&path).await;
    store.add_to_cart(product("p1", "Mug", 1250));
    store.add_to_cart(product("p2", "Poster", 900));
    store.add_to_cart(product("p1", "Mug", 1250));
    store.decrement(&ProductId::from("p2")).wait().await.unwrap();
    let before = store.products();
    drop(store);

    let restarted = open(&path).await;
    let after = restarted.products();

    assert_eq!(after, before);
    assert_eq!(after.len(), 2);
    assert_eq!(after.items()[0].id, "p1");
    assert_eq!(after.items()[0].quantity, 2);
    assert_eq!(after.items()[1].quantity, 1);
    assert_eq!(after.subtotal(), Decimal::new(3400, 2));
}

#[tokio::test]
async fn test_snapshot_format_on_disk() {
    let path = temp_storage_path();
    let store = open(&path).await;
    store
        .add_to_cart(product("p1", "Mug", 1000))
        .wait()
        .await
        .unwrap();

    let blob = FileStorage::new(&path)
        .get(CART_STORAGE_KEY)
        .await
        .unwrap()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&blob).unwrap();

    let item = value[0].as_object().unwrap();
    assert_eq!(value.as_array().unwrap().len(), 1);
    assert_eq!(item.len(), 5);
    assert_eq!(item["id"], "p1");
    assert_eq!(item["title"], "Mug");
    assert_eq!(item["image_url"], "https://cdn.example/p1.png");
    assert_eq!(item["quantity"], 1);
    // Price is a plain JSON number carrying the exact decimal digits
    assert_eq!(item["price"].to_string(), "10.00");
}

#[tokio::test]
async fn test_snapshot_written_by_other_client_is_restored() {
    let path = temp_storage_path();
    let storage = FileStorage::new(&path);
    storage
        .set(
            CART_STORAGE_KEY,
            r#"[{"id":"x","title":"From app","image_url":"u","price":3,"quantity":4}]"#
                .to_string(),
        )
        .await
        .unwrap();

    let store = open(&path).await;
    let item = store.products().get(&ProductId::from("x")).cloned().unwrap();

    assert_eq!(item.title, "From app");
    assert_eq!(item.price, Decimal::from(3));
    assert_eq!(item.quantity, 4);
}

#[tokio::test]
async fn test_malformed_snapshot_starts_empty_and_is_overwritten() {
    let path = temp_storage_path();
    FileStorage::new(&path)
        .set(CART_STORAGE_KEY, "[{\"id\":".to_string())
        .await
        .unwrap();

    let store = open(&path).await;
    assert!(store.products().is_empty());

    store
        .increment(&ProductId::from("missing"))
        .wait()
        .await
        .unwrap();

    let blob = FileStorage::new(&path)
        .get(CART_STORAGE_KEY)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(serde_json::from_str::<Cart>(&blob).unwrap(), Cart::empty());
}

#[tokio::test]
async fn test_other_keys_in_document_are_preserved() {
    let path = temp_storage_path();
    let storage = FileStorage::new(&path);
    storage
        .set("@GoMarketplace:theme", "dark".to_string())
        .await
        .unwrap();

    let store = open(&path).await;
    store
        .add_to_cart(product("p1", "Mug", 100))
        .wait()
        .await
        .unwrap();

    assert_eq!(
        storage.get("@GoMarketplace:theme").await.unwrap().as_deref(),
        Some("dark")
    );
}

// =============================================================================
// Write ordering
// =============================================================================

#[tokio::test]
async fn test_rapid_mutations_persist_latest_state() {
    let path = temp_storage_path();
    let store = open(&path).await;

    let mut last = None;
    for _ in 0..20 {
        last = Some(store.add_to_cart(product("p1", "Mug", 100)));
    }
    last.unwrap().wait().await.unwrap();

    let restarted = open(&path).await;
    assert_eq!(restarted.products().item_count(), 20);
    assert_eq!(restarted.products().len(), 1);
}

#[tokio::test]
async fn test_decrement_never_removes_line() {
    let path = temp_storage_path();
    let store = open(&path).await;
    store.add_to_cart(product("p1", "Mug", 100));
    for _ in 0..5 {
        store.decrement(&ProductId::from("p1"));
    }
    store
        .decrement(&ProductId::from("p1"))
        .wait()
        .await
        .unwrap();

    let restarted = open(&path).await;
    assert_eq!(restarted.products().len(), 1);
    assert_eq!(restarted.products().items()[0].quantity, 1);
}
