//! QKart backend REST client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP via `reqwest`
//! - The backend is the source of truth for products and carts - NO local
//!   patching of server state, every cart response replaces the held records
//! - Wire types live in [`types`] and are converted to `qkart-core` types
//!   before being returned
//!
//! # Endpoints
//!
//! - `GET /products` - full product listing
//! - `GET /products/search?value=<text>` - listing scoped by a search term
//! - `GET /cart` - the session's cart (bearer token)
//! - `POST /cart` - upsert `{productId, qty}` and return the complete cart
//!
//! # Example
//!
//! ```rust,ignore
//! use qkart_storefront::backend::BackendClient;
//!
//! let client = BackendClient::new(&config);
//!
//! let products = client.get_products().await?;
//! let cart = client.upsert_cart(&session, &products[0].id, 1).await?;
//! ```

mod client;
mod conversions;
pub mod types;

pub use client::BackendClient;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection refused, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned {status}: {}", .message.as_deref().unwrap_or("(no message)"))]
    Status {
        /// HTTP status code.
        status: StatusCode,
        /// `message` field of the error body, if the backend sent one.
        message: Option<String>,
    },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built from the configured endpoint.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl BackendError {
    /// HTTP status of a non-success response.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message the backend attached to a non-success response.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
