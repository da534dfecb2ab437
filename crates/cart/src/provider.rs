//! Scoped access to a cart store.
//!
//! UI code deep in a call tree should not need a store handle threaded
//! through every function. A [`CartProvider`] installs its store for the
//! duration of a future (or closure), and [`use_cart`] fetches it from
//! anywhere inside that scope.
//!
//! The scope is task-local: futures passed to `tokio::spawn` from inside a
//! scope do not inherit it. Wrap them in [`CartProvider::scope`] again.

use std::future::Future;

use crate::error::{CartError, Result};
use crate::store::CartStore;

tokio::task_local! {
    static CURRENT_CART: CartStore;
}

/// Makes a store available to [`use_cart`] within a scope.
#[derive(Debug, Clone)]
pub struct CartProvider {
    store: CartStore,
}

impl CartProvider {
    /// Create a provider for `store`.
    #[must_use]
    pub const fn new(store: CartStore) -> Self {
        Self { store }
    }

    /// The store this provider hands out.
    #[must_use]
    pub const fn store(&self) -> &CartStore {
        &self.store
    }

    /// Run `future` with the store in scope.
    pub async fn scope<F: Future>(&self, future: F) -> F::Output {
        CURRENT_CART.scope(self.store.clone(), future).await
    }

    /// Run a synchronous closure with the store in scope.
    pub fn sync_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        CURRENT_CART.sync_scope(self.store.clone(), f)
    }
}

/// Fetch the store installed by the enclosing [`CartProvider`].
///
/// # Errors
///
/// Returns `CartError::NoProvider` when called outside a provider scope.
pub fn use_cart() -> Result<CartStore> {
    CURRENT_CART
        .try_with(CartStore::clone)
        .map_err(|_| CartError::NoProvider)
}
