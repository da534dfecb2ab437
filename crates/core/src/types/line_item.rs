//! Cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::ProductId;

/// One product entry in the cart, carrying a quantity.
///
/// This is also the on-disk shape: a stored cart snapshot is a JSON array of
/// objects with exactly these five fields.
///
/// ```json
/// {"id":"p1","title":"Mug","image_url":"https://cdn/mug.png","price":12.5,"quantity":2}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Catalog product this line refers to.
    pub id: ProductId,
    /// Display name.
    pub title: String,
    /// Display image reference.
    pub image_url: String,
    /// Unit price, stored as a JSON number with its exact decimal digits.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
    /// Number of units. At least 1 while the item is in the cart; a stored
    /// 0 reads back as 1.
    #[serde(deserialize_with = "at_least_one")]
    pub quantity: u32,
}

fn at_least_one<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    u32::deserialize(deserializer).map(|quantity| quantity.max(1))
}

impl LineItem {
    /// Create a line item for a product entering the cart (quantity 1).
    #[must_use]
    pub fn first_of(product: NewLineItem) -> Self {
        Self {
            id: product.id,
            title: product.title,
            image_url: product.image_url,
            price: product.price,
            quantity: 1,
        }
    }

    /// Unit price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A product as offered to `add_to_cart`.
///
/// Carries no quantity: adding always starts a new line at 1 or bumps an
/// existing line by 1, whatever the caller had in mind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
}

impl NewLineItem {
    /// Create a new product entry.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

impl From<LineItem> for NewLineItem {
    fn from(item: LineItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
        }
    }
}
