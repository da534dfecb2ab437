//! Background persistence worker.
//!
//! Each [`CartStore`](crate::CartStore) owns exactly one worker task. The
//! worker restores the stored snapshot first, then drains the write queue in
//! order, one storage write per mutation. Because a single task performs every
//! write, the slot always ends up holding the snapshot of the latest mutation.
//!
//! Mutations made before the restore lands are replayed on top of the loaded
//! snapshot, and their queued writes carry the replayed carts instead of the
//! ones built on the empty placeholder.

use std::sync::Arc;

use go_marketplace_core::Cart;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument, warn};

use crate::error::Result;
use crate::storage::CartStorage;
use crate::store::Shared;

/// Outcome of restore and write operations, published to persistence subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceEvent {
    /// The stored snapshot was loaded into the cart.
    Restored {
        /// Number of line items restored (0 if the slot was empty or malformed).
        items: usize,
        /// Mutations made before the restore finished, replayed on top of it.
        replayed: usize,
    },
    /// The snapshot for a mutation was written.
    Saved { revision: u64 },
    /// Writing the snapshot for a mutation failed.
    Failed { revision: u64, error: String },
}

/// A queued snapshot write.
pub(crate) struct WriteRequest {
    pub(crate) revision: u64,
    pub(crate) snapshot: Cart,
    pub(crate) done: oneshot::Sender<Result<()>>,
}

/// Spawn the worker for a store. Runs until every store handle is dropped.
pub(crate) fn spawn(
    shared: Arc<Shared>,
    storage: Arc<dyn CartStorage>,
    key: String,
    requests: mpsc::UnboundedReceiver<WriteRequest>,
) {
    tokio::spawn(run(shared, storage, key, requests));
}

async fn run(
    shared: Arc<Shared>,
    storage: Arc<dyn CartStorage>,
    key: String,
    mut requests: mpsc::UnboundedReceiver<WriteRequest>,
) {
    // One entry per mutation made before the restore; those are the first
    // requests in the queue.
    let mut rebased = restore(&shared, storage.as_ref(), &key).await.into_iter();

    while let Some(WriteRequest {
        revision,
        snapshot,
        done,
    }) = requests.recv().await
    {
        let snapshot = rebased.next().unwrap_or(snapshot);
        let result = write_snapshot(storage.as_ref(), &key, &snapshot).await;

        let event = match &result {
            Ok(()) => {
                debug!(revision, items = snapshot.len(), "Cart snapshot persisted");
                PersistenceEvent::Saved { revision }
            }
            Err(e) => {
                error!(revision, error = %e, "Failed to persist cart snapshot");
                PersistenceEvent::Failed {
                    revision,
                    error: e.to_string(),
                }
            }
        };

        // No subscribers is fine, and callers may have dropped their handle.
        let _ = shared.events.send(event);
        let _ = done.send(result);
    }

    debug!("Cart persistence worker stopped");
}

/// Load the stored snapshot, replay any mutations made in the meantime on
/// top of it and install the result.
///
/// Returns the cart after each replayed mutation, in mutation order.
#[instrument(skip(shared, storage))]
async fn restore(shared: &Shared, storage: &dyn CartStorage, key: &str) -> Vec<Cart> {
    let loaded = match storage.get(key).await {
        Ok(Some(blob)) if !blob.trim().is_empty() => decode(&blob),
        Ok(_) => Cart::empty(),
        Err(e) => {
            warn!(error = %e, "Failed to read stored cart, starting empty");
            Cart::empty()
        }
    };
    let items = loaded.len();

    let mut rebased = Vec::new();
    shared.cart.send_if_modified(|cart| {
        let journal = shared.lock_journal().take().unwrap_or_default();

        let mut merged = loaded.to_vec();
        for op in &journal {
            op.apply(&mut merged);
            rebased.push(Cart::from(merged.clone()));
        }
        let merged = Cart::from(merged);

        if *cart == merged {
            false
        } else {
            *cart = merged;
            true
        }
    });

    let replayed = rebased.len();
    info!(items, replayed, "Restored cart from storage");
    let _ = shared.events.send(PersistenceEvent::Restored { items, replayed });
    shared.restored.send_replace(true);

    rebased
}

/// Parse a stored snapshot. Malformed snapshots read as an empty cart.
fn decode(blob: &str) -> Cart {
    serde_json::from_str(blob).unwrap_or_else(|e| {
        warn!(error = %e, "Stored cart snapshot is malformed, starting empty");
        Cart::empty()
    })
}

async fn write_snapshot(storage: &dyn CartStorage, key: &str, snapshot: &Cart) -> Result<()> {
    let blob = serde_json::to_string(snapshot)?;
    storage.set(key, blob).await?;
    Ok(())
}
