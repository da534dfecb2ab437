//! Product identifier newtype.
//!
//! Product IDs come from the catalog as opaque strings. Wrapping them keeps
//! them from being mixed up with titles or image URLs, which are also strings.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a catalog product.
///
/// Serialized transparently as a JSON string, so a stored cart snapshot reads
/// `"id": "p1"` rather than a nested object.
///
/// ## Examples
///
/// ```
/// use go_marketplace_core::ProductId;
///
/// let id = ProductId::from("p1");
/// assert_eq!(id.as_str(), "p1");
/// assert_eq!(id.to_string(), "p1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a new product ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ProductId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ProductId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_serializes_transparently() {
        let id = ProductId::from("p1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p1\"");

        let parsed: ProductId = serde_json::from_str("\"p2\"").unwrap();
        assert_eq!(parsed, "p2");
    }

    #[test]
    fn test_product_id_conversions() {
        let id = ProductId::new(String::from("abc"));
        assert_eq!(id.as_ref(), "abc");
        assert_eq!(String::from(id.clone()), "abc");
        assert_eq!(id.into_inner(), "abc");
    }
}
