//! Product and catalog types.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Price, ProductId, Rating};

/// A product available to buy.
///
/// Products are owned by the backend; the client only ever holds immutable
/// snapshots of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Backend product ID.
    pub id: ProductId,
    /// Name or title of the product.
    pub name: String,
    /// Category the product belongs to (e.g., "Phones").
    pub category: String,
    /// Price to buy one unit. Always greater than zero.
    pub cost: Price,
    /// Aggregate rating.
    pub rating: Rating,
    /// URL of the product image.
    pub image: String,
}

/// The product list currently available for display.
///
/// Sourced either from the default listing or from a search query. Cloning is
/// cheap: the product slice is shared, so a `Catalog` can be handed out as a
/// consistent snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    products: Arc<[Product]>,
}

impl Catalog {
    /// Create a catalog from a product list, preserving order.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: products.into(),
        }
    }

    /// An empty catalog.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Products in listing order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Iterate over products in listing order.
    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.products.iter()
    }

    /// Find a product by ID. The first match wins if the listing repeats an ID.
    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl From<Vec<Product>> for Catalog {
    fn from(products: Vec<Product>) -> Self {
        Self::new(products)
    }
}

impl FromIterator<Product> for Catalog {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
