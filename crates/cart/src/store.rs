//! The cart store.
//!
//! Holds the ordered list of line items in memory and mirrors every mutation
//! to the storage collaborator. Mutations update the in-memory cart
//! synchronously and return immediately; the snapshot write happens on the
//! store's persistence worker.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use go_marketplace_core::{Cart, LineItem, NewLineItem, ProductId, find_position};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, instrument, warn};

use crate::error::{CartError, Result};
use crate::persistence::{self, PersistenceEvent, WriteRequest};
use crate::storage::{CART_STORAGE_KEY, CartStorage};

/// Buffered persistence events per subscriber before old ones are dropped.
const EVENT_CAPACITY: usize = 64;

/// State shared between store handles and the persistence worker.
pub(crate) struct Shared {
    pub(crate) cart: watch::Sender<Cart>,
    /// Number of mutations applied so far. Only changed while holding the
    /// `cart` write lock, so it matches the order of queued writes.
    pub(crate) revision: AtomicU64,
    pub(crate) restored: watch::Sender<bool>,
    pub(crate) events: broadcast::Sender<PersistenceEvent>,
    /// Mutations applied before the restore finished, in order. `None` once
    /// the restore has replayed them. Only locked inside the `cart` lock.
    journal: Mutex<Option<Vec<CartOp>>>,
}

impl Shared {
    pub(crate) fn lock_journal(&self) -> MutexGuard<'_, Option<Vec<CartOp>>> {
        self.journal.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A single cart mutation.
#[derive(Debug, Clone)]
pub(crate) enum CartOp {
    Add(NewLineItem),
    Increment(ProductId),
    Decrement(ProductId),
}

impl CartOp {
    pub(crate) fn apply(&self, items: &mut Vec<LineItem>) {
        match self {
            Self::Add(product) => {
                match find_position(items, &product.id).and_then(|index| items.get_mut(index)) {
                    Some(item) => {
                        item.quantity = item.quantity.saturating_add(1);
                        debug!(quantity = item.quantity, "Incremented existing line");
                    }
                    None => {
                        debug!("Appended new line");
                        items.push(LineItem::first_of(product.clone()));
                    }
                }
            }
            Self::Increment(id) => {
                match find_position(items, id).and_then(|index| items.get_mut(index)) {
                    Some(item) => {
                        item.quantity = item.quantity.saturating_add(1);
                        debug!(quantity = item.quantity, "Incremented line");
                    }
                    None => debug!("Product not in cart"),
                }
            }
            Self::Decrement(id) => {
                match find_position(items, id).and_then(|index| items.get_mut(index)) {
                    Some(item) if item.quantity > 1 => {
                        item.quantity -= 1;
                        debug!(quantity = item.quantity, "Decremented line");
                    }
                    Some(_) => debug!("Line already at quantity 1, keeping it"),
                    None => debug!("Product not in cart"),
                }
            }
        }
    }
}

/// Handle to a cart store.
///
/// This struct is cheaply cloneable; all clones share one cart and one
/// persistence worker. The worker exits once every handle is dropped and the
/// queued writes are flushed.
#[derive(Clone)]
pub struct CartStore {
    shared: Arc<Shared>,
    writes: mpsc::UnboundedSender<WriteRequest>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &*self.shared.cart.borrow())
            .field("revision", &self.revision())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Open a store over `storage` using the default cart key.
    ///
    /// The cart starts empty and the stored snapshot is restored in the
    /// background; use [`ready`](Self::ready) to wait for it.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn open(storage: Arc<dyn CartStorage>) -> Self {
        Self::open_with_key(storage, CART_STORAGE_KEY)
    }

    /// Open a store over `storage`, keeping the snapshot under `key`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn open_with_key(storage: Arc<dyn CartStorage>, key: impl Into<String>) -> Self {
        let (cart, _) = watch::channel(Cart::empty());
        let (restored, _) = watch::channel(false);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let shared = Arc::new(Shared {
            cart,
            revision: AtomicU64::new(0),
            restored,
            events,
            journal: Mutex::new(Some(Vec::new())),
        });

        let (writes, requests) = mpsc::unbounded_channel();
        persistence::spawn(Arc::clone(&shared), storage, key.into(), requests);

        Self { shared, writes }
    }

    /// Wait until the stored snapshot has been restored.
    pub async fn ready(&self) {
        let mut restored = self.shared.restored.subscribe();
        // The sender lives in `shared`, which we hold, so this only returns once set.
        let _ = restored.wait_for(|done| *done).await;
    }

    /// Whether the initial restore has finished.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.shared.restored.borrow()
    }

    /// Current cart snapshot.
    #[must_use]
    pub fn products(&self) -> Cart {
        self.shared.cart.borrow().clone()
    }

    /// Subscribe to cart changes.
    ///
    /// Receivers are only notified when the cart content actually changes;
    /// no-op mutations (unknown IDs, decrementing a line at 1) stay silent.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.shared.cart.subscribe()
    }

    /// Subscribe to restore and write outcomes.
    #[must_use]
    pub fn subscribe_persistence(&self) -> broadcast::Receiver<PersistenceEvent> {
        self.shared.events.subscribe()
    }

    /// Number of mutations applied to this store.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.shared.revision.load(Ordering::SeqCst)
    }

    /// Add one unit of a product.
    ///
    /// Bumps the existing line if the product is already in the cart,
    /// otherwise appends a new line at quantity 1.
    #[instrument(skip(self, product), fields(id = %product.id))]
    pub fn add_to_cart(&self, product: NewLineItem) -> PendingWrite {
        self.mutate(CartOp::Add(product))
    }

    /// Add one unit to an existing line. Unknown IDs leave the cart unchanged.
    #[instrument(skip(self, id), fields(id = %id))]
    pub fn increment(&self, id: &ProductId) -> PendingWrite {
        self.mutate(CartOp::Increment(id.clone()))
    }

    /// Remove one unit from an existing line.
    ///
    /// A line never drops below quantity 1: decrementing it at 1 leaves it in
    /// the cart unchanged. Unknown IDs leave the cart unchanged.
    #[instrument(skip(self, id), fields(id = %id))]
    pub fn decrement(&self, id: &ProductId) -> PendingWrite {
        self.mutate(CartOp::Decrement(id.clone()))
    }

    /// Apply `op` to a copy of the items, publish the result and queue
    /// exactly one snapshot write, whether or not anything changed.
    fn mutate(&self, op: CartOp) -> PendingWrite {
        let (done, receiver) = oneshot::channel();
        let mut revision = 0;

        self.shared.cart.send_if_modified(|cart| {
            let mut items = cart.to_vec();
            op.apply(&mut items);

            let changed = items.as_slice() != cart.items();
            if changed {
                *cart = Cart::from(items);
            }

            // Replayed over the stored snapshot once the restore lands.
            if let Some(journal) = self.shared.lock_journal().as_mut() {
                journal.push(op);
            }

            // Queue under the cart lock so write order matches mutation order.
            revision = self.shared.revision.fetch_add(1, Ordering::SeqCst) + 1;
            let request = WriteRequest {
                revision,
                snapshot: cart.clone(),
                done,
            };
            if self.writes.send(request).is_err() {
                warn!(revision, "Persistence worker stopped, snapshot not written");
            }

            changed
        });

        PendingWrite { revision, receiver }
    }
}

/// Handle to the snapshot write queued by a mutation.
///
/// Dropping it is fine: the write still happens. Await [`wait`](Self::wait)
/// to learn whether it succeeded.
#[derive(Debug)]
pub struct PendingWrite {
    revision: u64,
    receiver: oneshot::Receiver<Result<()>>,
}

impl PendingWrite {
    /// Revision of the mutation this write belongs to.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Wait for the snapshot to reach storage.
    ///
    /// # Errors
    ///
    /// Returns the storage or serialization error from the write, or
    /// `CartError::WorkerStopped` if the worker went away first.
    pub async fn wait(self) -> Result<()> {
        self.receiver.await.map_err(|_| CartError::WorkerStopped)?
    }
}
