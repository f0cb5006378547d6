//! Backend REST client implementation.

use std::sync::Arc;

use qkart_core::{CartRecord, Product, ProductId};
use reqwest::{StatusCode, header::AUTHORIZATION};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::StorefrontConfig;
use crate::session::Session;

use super::BackendError;
use super::conversions::{convert_cart, convert_products};
use super::types::{CartEntryPayload, CartUpdatePayload, ErrorBody, ProductPayload};

/// Maximum number of body characters included in error logs.
const LOGGED_BODY_CHARS: usize = 500;

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the QKart backend REST API.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    endpoint: Url,
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                endpoint: config.api_endpoint.clone(),
            }),
        }
    }

    /// Resolve a path relative to the configured endpoint.
    fn url(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.inner.endpoint.join(path)?)
    }

    /// Send a request and decode a JSON success body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            let body = serde_json::from_str::<ErrorBody>(&response_text).unwrap_or_default();
            tracing::error!(
                status = %status,
                success = body.success,
                body = %response_text.chars().take(LOGGED_BODY_CHARS).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(BackendError::Status {
                status,
                message: body.message,
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(LOGGED_BODY_CHARS).collect::<String>(),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get the full product listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend answers with a
    /// non-success status, or the body is malformed.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Product>, BackendError> {
        let url = self.url("products")?;
        let payloads: Vec<ProductPayload> = self.execute(self.inner.client.get(url)).await?;
        debug!(count = payloads.len(), "Fetched product listing");
        Ok(convert_products(payloads))
    }

    /// Get the product listing scoped by a search term.
    ///
    /// A `404` answer means nothing matched and yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend answers with any
    /// other non-success status, or the body is malformed.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, BackendError> {
        let mut url = self.url("products/search")?;
        url.query_pairs_mut().append_pair("value", query);

        match self
            .execute::<Vec<ProductPayload>>(self.inner.client.get(url))
            .await
        {
            Ok(payloads) => {
                debug!(count = payloads.len(), "Fetched search results");
                Ok(convert_products(payloads))
            }
            Err(BackendError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                debug!("Search matched no products");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Get the complete cart of a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the token is rejected (`401`),
    /// or the body is malformed.
    #[instrument(skip(self, session))]
    pub async fn get_cart(&self, session: &Session) -> Result<Vec<CartRecord>, BackendError> {
        let url = self.url("cart")?;
        let request = self
            .inner
            .client
            .get(url)
            .header(AUTHORIZATION, session.bearer());

        let entries: Vec<CartEntryPayload> = self.execute(request).await?;
        Ok(convert_cart(entries))
    }

    /// Set the quantity of a product in the cart and return the complete
    /// new cart. Quantity 0 removes the product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the token is rejected (`401`),
    /// the product is unknown (`404`), or the body is malformed.
    #[instrument(skip(self, session), fields(product_id = %product_id))]
    pub async fn upsert_cart(
        &self,
        session: &Session,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Vec<CartRecord>, BackendError> {
        let url = self.url("cart")?;
        let body = CartUpdatePayload {
            product_id: product_id.as_str(),
            qty: quantity,
        };
        let request = self
            .inner
            .client
            .post(url)
            .header(AUTHORIZATION, session.bearer())
            .json(&body);

        let entries: Vec<CartEntryPayload> = self.execute(request).await?;
        Ok(convert_cart(entries))
    }
}
