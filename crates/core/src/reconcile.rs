//! Cart reconciliation and aggregates.
//!
//! Pure functions that join the backend's cart records with the locally held
//! catalog. Nothing here performs I/O or can fail.

use std::collections::HashMap;

use crate::types::{CartItem, CartRecord, Catalog, Price, Product, ProductId};

/// Merge cart records with the catalog into displayable cart items.
///
/// Emits one [`CartItem`] per record whose product is present in `catalog`,
/// in the order of `records`. Records whose product is not in the catalog
/// (e.g. the catalog currently holds search results) contribute nothing.
///
/// ```
/// use qkart_core::{reconcile, CartRecord, Catalog, ProductId};
///
/// let records = vec![CartRecord::new(ProductId::parse("p1").unwrap(), 2)];
/// assert!(reconcile(&records, &Catalog::empty()).is_empty());
/// ```
#[must_use]
pub fn reconcile(records: &[CartRecord], catalog: &Catalog) -> Vec<CartItem> {
    if records.is_empty() {
        return Vec::new();
    }

    let mut by_id: HashMap<&ProductId, &Product> = HashMap::with_capacity(catalog.len());
    for product in catalog {
        by_id.entry(&product.id).or_insert(product);
    }

    records
        .iter()
        .filter_map(|record| {
            by_id.get(&record.product_id).map(|product| CartItem {
                product: (*product).clone(),
                quantity: record.quantity,
            })
        })
        .collect()
}

/// Sum of `cost × quantity` over all items. Zero for an empty cart.
///
/// Saturates at [`rust_decimal::Decimal::MAX`] rather than overflowing.
#[must_use]
pub fn total_value(items: &[CartItem]) -> Price {
    items.iter().map(CartItem::line_total).sum()
}

/// Sum of quantities over all items. Zero for an empty cart.
#[must_use]
pub fn total_quantity(items: &[CartItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity)).sum()
}

/// Whether `product_id` already has a record with quantity of at least 1.
///
/// This is the duplicate scan behind "Add to cart": a linear pass over the
/// records.
#[must_use]
pub fn contains_product(records: &[CartRecord], product_id: &ProductId) -> bool {
    records
        .iter()
        .any(|record| &record.product_id == product_id && record.quantity >= 1)
}
