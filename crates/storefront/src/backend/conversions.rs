//! Wire type conversion functions.

use std::collections::HashSet;

use qkart_core::{CartRecord, Price, Product, ProductId, Rating};
use tracing::warn;

use super::types::{CartEntryPayload, ProductPayload};

/// Convert a product listing, skipping entries that violate product invariants.
pub fn convert_products(payloads: Vec<ProductPayload>) -> Vec<Product> {
    payloads.into_iter().filter_map(convert_product).collect()
}

/// Convert a single product. Returns `None` (and logs) for an invalid entry.
pub fn convert_product(payload: ProductPayload) -> Option<Product> {
    let id = match ProductId::try_from(payload.id) {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, name = %payload.name, "Skipping product with invalid id");
            return None;
        }
    };

    let cost = match Price::positive(payload.cost) {
        Ok(cost) => cost,
        Err(e) => {
            warn!(product_id = %id, error = %e, "Skipping product with invalid cost");
            return None;
        }
    };

    let rating = match Rating::new(payload.rating) {
        Ok(rating) => rating,
        Err(e) => {
            warn!(product_id = %id, error = %e, "Skipping product with invalid rating");
            return None;
        }
    };

    Some(Product {
        id,
        name: payload.name,
        category: payload.category,
        cost,
        rating,
        image: payload.image,
    })
}

/// Convert a complete cart into records.
///
/// Entries with quantity 0 are not resting state and are dropped. A repeated
/// product ID keeps its first occurrence so the record set never holds two
/// records for one product.
pub fn convert_cart(payloads: Vec<CartEntryPayload>) -> Vec<CartRecord> {
    let mut seen = HashSet::with_capacity(payloads.len());
    let mut records = Vec::with_capacity(payloads.len());

    for entry in payloads {
        let product_id = match ProductId::try_from(entry.product_id) {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Skipping cart entry with invalid product id");
                continue;
            }
        };

        if entry.qty == 0 {
            warn!(product_id = %product_id, "Skipping cart entry with zero quantity");
            continue;
        }

        if !seen.insert(product_id.clone()) {
            warn!(product_id = %product_id, "Skipping repeated cart entry");
            continue;
        }

        records.push(CartRecord::new(product_id, entry.qty));
    }

    records
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn payload(id: &str, cost: i64, rating: u8) -> ProductPayload {
        ProductPayload {
            id: id.to_string(),
            name: "iPhone XR".to_string(),
            category: "Phones".to_string(),
            cost: Decimal::from(cost),
            rating,
            image: "https://i.imgur.com/lulqWzW.jpg".to_string(),
        }
    }

    fn entry(product_id: &str, qty: u32) -> CartEntryPayload {
        CartEntryPayload {
            product_id: product_id.to_string(),
            qty,
        }
    }

    #[test]
    fn test_parse_backend_listing() {
        let body = r#"[
            {"name":"iPhone XR","category":"Phones","cost":100,"rating":4,
             "image":"https://i.imgur.com/lulqWzW.jpg","_id":"v4sLtEcMpzabRyfx"},
            {"name":"Basketball","category":"Sports","cost":100,"rating":5,
             "image":"https://i.imgur.com/lulqWzW.jpg","_id":"upLK9JbQ4rMhTwt4"}
        ]"#;
        let payloads: Vec<ProductPayload> = serde_json::from_str(body).unwrap();

        let products = convert_products(payloads);

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id.as_str(), "v4sLtEcMpzabRyfx");
        assert_eq!(products[1].category, "Sports");
        assert_eq!(products[1].rating.stars(), 5);
        assert_eq!(products[0].cost.amount(), Decimal::from(100));
    }

    #[test]
    fn test_invalid_products_are_skipped() {
        let products = convert_products(vec![
            payload("ok", 10, 3),
            payload("free", 0, 3),
            payload("", 10, 3),
            payload("stars", 10, 9),
        ]);

        let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["ok"]);
    }

    #[test]
    fn test_convert_cart_keeps_order() {
        let records = convert_cart(vec![entry("KCRwjF7lN97HnEaY", 3), entry("BW0jAAeDJmlZCF8i", 1)]);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].product_id.as_str(), "KCRwjF7lN97HnEaY");
        assert_eq!(records[0].quantity, 3);
        assert_eq!(records[1].quantity, 1);
    }

    #[test]
    fn test_convert_cart_drops_zero_and_repeats() {
        let records = convert_cart(vec![entry("a", 2), entry("b", 0), entry("a", 5), entry("c", 1)]);

        let pairs: Vec<(&str, u32)> = records
            .iter()
            .map(|r| (r.product_id.as_str(), r.quantity))
            .collect();
        assert_eq!(pairs, vec![("a", 2), ("c", 1)]);
    }
}
