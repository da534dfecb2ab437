//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! # Show the persisted cart
//! gm-cart show
//!
//! # Add one unit of a product
//! gm-cart add --id p1 --title "Mug" --image-url https://cdn/mug.png --price 12.50
//!
//! # Bump or lower a line's quantity
//! gm-cart increment p1
//! gm-cart decrement p1
//! ```
//!
//! Every command restores the stored cart first, applies its change inside a
//! `CartProvider` scope, waits for the snapshot write and prints the result.

use std::fmt::Write as _;

use go_marketplace_cart::{CartError, CartProvider, CartStore, use_cart};
use go_marketplace_core::{Cart, NewLineItem, ProductId};
use tracing::info;

use crate::config::CliConfig;

/// A change to apply to the cart.
#[derive(Debug, Clone)]
pub enum CartAction {
    Show,
    Add(NewLineItem),
    Increment(ProductId),
    Decrement(ProductId),
}

/// Open the configured store, apply `action` and print the cart.
///
/// # Errors
///
/// Returns an error if the snapshot write fails.
pub async fn run(config: &CliConfig, action: CartAction) -> Result<(), CartError> {
    let store = CartStore::open_with_key(config.open_storage(), config.cart_key.clone());
    store.ready().await;
    info!(items = store.products().len(), "Cart loaded");

    let provider = CartProvider::new(store);
    let cart = provider.scope(apply(action)).await?;

    #[allow(clippy::print_stdout)]
    {
        print!("{}", render(&cart));
    }
    Ok(())
}

/// Apply an action to the cart in scope and return the resulting snapshot.
async fn apply(action: CartAction) -> Result<Cart, CartError> {
    let cart = use_cart()?;

    let write = match action {
        CartAction::Show => return Ok(cart.products()),
        CartAction::Add(product) => cart.add_to_cart(product),
        CartAction::Increment(id) => cart.increment(&id),
        CartAction::Decrement(id) => cart.decrement(&id),
    };

    let revision = write.revision();
    write.wait().await?;
    info!(revision, "Cart saved");

    Ok(cart.products())
}

/// Format the cart as a plain-text table.
#[must_use]
pub fn render(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:<28} {:>10} {:>5} {:>12}",
        "ID", "TITLE", "PRICE", "QTY", "TOTAL"
    );
    for item in cart {
        let _ = writeln!(
            out,
            "{:<12} {:<28} {:>10.2} {:>5} {:>12.2}",
            item.id.as_str(),
            item.title,
            item.price,
            item.quantity,
            item.line_total()
        );
    }
    let _ = writeln!(
        out,
        "{} item(s), subtotal {:.2}",
        cart.item_count(),
        cart.subtotal()
    );
    out
}
