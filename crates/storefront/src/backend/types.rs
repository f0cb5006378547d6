//! Wire types for the backend REST API.
//!
//! These mirror the JSON shapes exactly and are converted into the domain
//! types from `qkart-core` before leaving this module.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product as returned by `GET /products` and `GET /products/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPayload {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub category: String,
    pub cost: Decimal,
    pub rating: u8,
    pub image: String,
}

/// A cart entry as returned by `GET /cart` and `POST /cart`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartEntryPayload {
    #[serde(rename = "productId")]
    pub product_id: String,
    pub qty: u32,
}

/// Request body of `POST /cart`.
#[derive(Debug, Serialize)]
pub struct CartUpdatePayload<'a> {
    #[serde(rename = "productId")]
    pub product_id: &'a str,
    pub qty: u32,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}
