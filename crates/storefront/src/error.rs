//! Unified error handling with Sentry integration.
//!
//! Every storefront operation fails with one of the error kinds below. None of
//! them is fatal: the failing call reports, local state stays as it was, and
//! the application keeps running. [`report`] captures transport failures to
//! Sentry before the caller shows [`CartError::user_message`] or
//! [`CatalogError::user_message`] to the visitor.

use qkart_core::ProductId;
use reqwest::StatusCode;
use thiserror::Error;

use crate::backend::BackendError;

/// Message shown for any transport or backend failure.
pub const CONNECTIVITY_MESSAGE: &str =
    "Could not reach the store. Check that the backend is running, reachable and returns valid JSON.";

/// Errors from catalog reads.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The listing could not be fetched or decoded.
    #[error("Network error: {0}")]
    Network(#[from] BackendError),
}

impl CatalogError {
    /// Message safe to show to the visitor.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Network(_) => CONNECTIVITY_MESSAGE,
        }
    }
}

/// Errors from cart reads and writes.
#[derive(Debug, Error)]
pub enum CartError {
    /// No session is present, or the backend rejected its token.
    #[error("Login required")]
    AuthRequired,

    /// "Add to cart" on a product that is already in the cart.
    #[error("Product {product_id} is already in the cart")]
    DuplicateItem {
        /// Product that is already present.
        product_id: ProductId,
    },

    /// The backend does not know the product.
    #[error("Product {product_id} not found: {message}")]
    NotFound {
        /// Product that was rejected.
        product_id: ProductId,
        /// Message from the backend.
        message: String,
    },

    /// Transport or backend failure, including malformed responses.
    #[error("Network error: {0}")]
    Network(BackendError),
}

impl CartError {
    /// Classify a backend failure of a cart call.
    ///
    /// `401` means the session is not (or no longer) valid. `404` on a
    /// mutation means the product ID is unknown.
    pub(crate) fn from_backend(err: BackendError, product_id: Option<&ProductId>) -> Self {
        match (err.status(), product_id) {
            (Some(status), _) if status == StatusCode::UNAUTHORIZED => Self::AuthRequired,
            (Some(status), Some(product_id)) if status == StatusCode::NOT_FOUND => {
                Self::NotFound {
                    product_id: product_id.clone(),
                    message: err
                        .server_message()
                        .unwrap_or("Product doesn't exist")
                        .to_string(),
                }
            }
            _ => Self::Network(err),
        }
    }

    /// Message safe to show to the visitor.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthRequired => "Login to add an item to the Cart".to_string(),
            Self::DuplicateItem { .. } => {
                "Item already in cart. Use the cart sidebar to update quantity or remove item."
                    .to_string()
            }
            Self::NotFound { message, .. } => message.clone(),
            Self::Network(_) => CONNECTIVITY_MESSAGE.to_string(),
        }
    }
}

/// Errors that can be reported to Sentry.
pub trait Reportable: std::error::Error {
    /// Whether this error indicates a transport or backend failure.
    fn is_network(&self) -> bool;
}

impl Reportable for CatalogError {
    fn is_network(&self) -> bool {
        true
    }
}

impl Reportable for CartError {
    fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Log an error and capture transport failures to Sentry.
///
/// User-actionable errors are only logged; they are expected outcomes.
pub fn report<E: Reportable>(err: &E) {
    if err.is_network() {
        let event_id = sentry::capture_error(err);
        tracing::error!(
            error = %err,
            sentry_event_id = %event_id,
            "Storefront request failed"
        );
    } else {
        tracing::warn!(error = %err, "Storefront request rejected");
    }
}

/// Set the Sentry user context from the session's display name.
///
/// Call this after login to associate errors with the visitor.
pub fn set_sentry_user(username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the visitor.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for visitor actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Quantity change", Some(&[("product_id", "p1"), ("quantity", "2")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn status_error(status: StatusCode, message: Option<&str>) -> BackendError {
        BackendError::Status {
            status,
            message: message.map(String::from),
        }
    }

    fn product_id() -> ProductId {
        ProductId::parse("BW0jAAeDJmlZCF8i").unwrap()
    }

    #[test]
    fn test_unauthorized_maps_to_auth_required() {
        let err = CartError::from_backend(
            status_error(StatusCode::UNAUTHORIZED, Some("Protected route")),
            None,
        );
        assert!(matches!(err, CartError::AuthRequired));
        assert!(!err.is_network());
    }

    #[test]
    fn test_not_found_keeps_backend_message() {
        let err = CartError::from_backend(
            status_error(StatusCode::NOT_FOUND, Some("Product doesn't exist")),
            Some(&product_id()),
        );
        assert!(matches!(err, CartError::NotFound { .. }));
        assert_eq!(err.user_message(), "Product doesn't exist");
    }

    #[test]
    fn test_not_found_without_product_is_network() {
        let err = CartError::from_backend(status_error(StatusCode::NOT_FOUND, None), None);
        assert!(matches!(err, CartError::Network(_)));
    }

    #[test]
    fn test_server_error_is_network() {
        let err = CartError::from_backend(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, Some("Something went wrong")),
            Some(&product_id()),
        );
        assert!(matches!(err, CartError::Network(_)));
        assert!(err.is_network());
        assert_eq!(err.user_message(), CONNECTIVITY_MESSAGE);
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            CartError::AuthRequired.user_message(),
            "Login to add an item to the Cart"
        );
        assert_eq!(
            CartError::DuplicateItem {
                product_id: product_id()
            }
            .to_string(),
            "Product BW0jAAeDJmlZCF8i is already in the cart"
        );
    }

    #[test]
    fn test_catalog_error_hides_details() {
        let err = CatalogError::from(status_error(StatusCode::INTERNAL_SERVER_ERROR, Some("stack trace")));
        assert_eq!(err.user_message(), CONNECTIVITY_MESSAGE);
        assert!(err.to_string().contains("500"));
    }
}
