//! Immutable cart snapshots.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{LineItem, ProductId};

/// A read-only view of the cart at one point in time.
///
/// Cloning is cheap (`Arc`), so snapshots can be handed to every subscriber
/// without copying the items. Serializes as a bare JSON array of
/// [`LineItem`]s, which is the stored snapshot format.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cart {
    items: Arc<[LineItem]>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// All line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the first line item with the given product ID.
    ///
    /// Linear scan; carts hold tens of items at most.
    #[must_use]
    pub fn position(&self, id: &ProductId) -> Option<usize> {
        find_position(&self.items, id)
    }

    /// The line item for a product, if it is in the cart.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Total number of units across all lines (the cart badge count).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Copy the items out for mutation.
    #[must_use]
    pub fn to_vec(&self) -> Vec<LineItem> {
        self.items.to_vec()
    }
}

/// Linear lookup shared by [`Cart::position`] and callers holding a plain slice.
#[must_use]
pub fn find_position(items: &[LineItem], id: &ProductId) -> Option<usize> {
    items.iter().position(|item| &item.id == id)
}

impl From<Vec<LineItem>> for Cart {
    fn from(items: Vec<LineItem>) -> Self {
        Self {
            items: items.into(),
        }
    }
}

impl FromIterator<LineItem> for Cart {
    fn from_iter<I: IntoIterator<Item = LineItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<LineItem>::deserialize(deserializer).map(Self::from)
    }
}
