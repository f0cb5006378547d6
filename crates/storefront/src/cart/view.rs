//! Display model for the cart sidebar and the checkout order details.
//!
//! Built fresh on every render from the held records and the current catalog.
//! Records whose product is missing from the catalog are not shown.

use qkart_core::{Catalog, CartItem, Price, ProductId, reconcile, total_quantity, total_value};
use serde::Serialize;

use super::CartSnapshot;

/// Shown instead of the line items when the cart is empty.
pub const EMPTY_CART_MESSAGE: &str = "Cart is empty. Add more items to the cart to checkout.";

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub quantity: u32,
    /// Price of one unit.
    pub price: Price,
    /// `price × quantity`.
    pub line_price: Price,
}

impl From<CartItem> for CartItemView {
    fn from(item: CartItem) -> Self {
        let line_price = item.line_total();
        Self {
            product_id: item.product.id,
            name: item.product.name,
            image: item.product.image,
            quantity: item.quantity,
            price: item.product.cost,
            line_price,
        }
    }
}

/// The cart as shown to the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: Price,
    pub item_count: u64,
    pub is_empty: bool,
}

impl CartView {
    /// Join the held records with `catalog`.
    #[must_use]
    pub fn build(snapshot: &CartSnapshot, catalog: &Catalog) -> Self {
        let items = reconcile(snapshot.records(), catalog);
        let subtotal = total_value(&items);
        let item_count = total_quantity(&items);

        Self {
            is_empty: items.is_empty(),
            items: items.into_iter().map(CartItemView::from).collect(),
            subtotal,
            item_count,
        }
    }
}

/// Read-only order details shown at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    pub products: u64,
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
}

impl From<&CartView> for CheckoutSummary {
    fn from(view: &CartView) -> Self {
        // Shipping is free.
        let shipping = Price::ZERO;
        Self {
            products: view.item_count,
            subtotal: view.subtotal,
            shipping,
            total: view.subtotal + shipping,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use qkart_core::{CartRecord, Product, Rating};
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: &str, cost: i64) -> Product {
        Product {
            id: ProductId::parse(id).unwrap(),
            name: format!("Product {id}"),
            category: "Fashion".to_string(),
            cost: Price::positive(Decimal::from(cost)).unwrap(),
            rating: Rating::new(4).unwrap(),
            image: format!("https://img.example/{id}.png"),
        }
    }

    fn snapshot(records: &[(&str, u32)]) -> CartSnapshot {
        let records: Vec<CartRecord> = records
            .iter()
            .map(|(id, qty)| CartRecord::new(ProductId::parse(id).unwrap(), *qty))
            .collect();
        CartSnapshot {
            records: Arc::from(records),
            revision: 1,
        }
    }

    fn price(amount: i64) -> Price {
        Price::new(Decimal::from(amount)).unwrap()
    }

    #[test]
    fn test_build_view() {
        let catalog = Catalog::new(vec![product("p1", 100), product("p2", 50)]);
        let view = CartView::build(&snapshot(&[("p1", 2), ("p2", 1)]), &catalog);

        assert!(!view.is_empty);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[0].line_price, price(200));
        assert_eq!(view.items[1].name, "Product p2");
        assert_eq!(view.subtotal, price(250));
        assert_eq!(view.item_count, 3);
    }

    #[test]
    fn test_missing_products_are_hidden() {
        let catalog = Catalog::new(vec![product("p2", 50)]);
        let view = CartView::build(&snapshot(&[("p1", 2), ("p2", 1)]), &catalog);

        assert_eq!(view.items.len(), 1);
        assert_eq!(view.subtotal, price(50));
    }

    #[test]
    fn test_empty_cart() {
        let view = CartView::build(&CartSnapshot::default(), &Catalog::empty());

        assert!(view.is_empty);
        assert_eq!(view.subtotal, Price::ZERO);
        assert_eq!(view.item_count, 0);
    }

    #[test]
    fn test_checkout_summary_has_free_shipping() {
        let catalog = Catalog::new(vec![product("p1", 100), product("p2", 50)]);
        let view = CartView::build(&snapshot(&[("p1", 2), ("p2", 1)]), &catalog);

        let summary = CheckoutSummary::from(&view);

        assert_eq!(summary.products, 3);
        assert_eq!(summary.shipping, Price::ZERO);
        assert_eq!(summary.total, price(250));
        assert_eq!(summary.total.to_string(), "$250.00");
    }
}
