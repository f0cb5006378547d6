//! Cart record and cart item types.

use serde::{Deserialize, Serialize};

use super::{Price, Product, ProductId};

/// An authoritative `(product, quantity)` pair held by the backend.
///
/// The full set of records for a session is the single source of truth for
/// what is in the cart. It is replaced wholesale whenever the backend returns
/// a new set, never patched field by field. A resting record always has a
/// quantity of at least 1; quantity 0 only exists as a removal request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartRecord {
    /// Product this record refers to.
    pub product_id: ProductId,
    /// Number of units in the cart.
    pub quantity: u32,
}

impl CartRecord {
    /// Create a cart record.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// A cart line ready for display: a [`CartRecord`] joined with its [`Product`].
///
/// Cart items are derived on every render from the current records and the
/// current catalog. They are never stored or mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Snapshot of the matching catalog product.
    pub product: Product,
    /// Quantity taken from the cart record.
    pub quantity: u32,
}

impl CartItem {
    /// ID of the product in this line.
    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    /// `cost × quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.cost.times(self.quantity)
    }
}
