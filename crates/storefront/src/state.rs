//! Storefront handle shared by the surrounding application.

use std::sync::Arc;

use crate::backend::BackendClient;
use crate::cart::{CartView, CheckoutSummary, MutationCoordinator};
use crate::catalog::CatalogStore;
use crate::config::StorefrontConfig;
use crate::error::{CatalogError, clear_sentry_user};
use crate::search::SearchDebouncer;

/// Everything one visitor's storefront needs.
///
/// This struct is cheaply cloneable via `Arc`; clones share the backend
/// connection pool, the catalog and the held cart.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    catalog: CatalogStore,
    cart: MutationCoordinator,
}

impl Storefront {
    /// Wire up the backend client, catalog store and cart coordinator.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let backend = BackendClient::new(&config);
        let catalog = CatalogStore::new(backend.clone(), &config);
        let cart = MutationCoordinator::new(backend);

        Self {
            inner: Arc::new(StorefrontInner {
                config,
                catalog,
                cart,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogStore {
        &self.inner.catalog
    }

    #[must_use]
    pub fn cart(&self) -> &MutationCoordinator {
        &self.inner.cart
    }

    /// Start a search debouncer over this storefront's catalog, using the
    /// configured quiet window.
    #[must_use]
    pub fn search_debouncer(&self) -> SearchDebouncer {
        SearchDebouncer::spawn(
            Arc::new(self.inner.catalog.clone()),
            self.inner.config.search_debounce,
        )
    }

    /// The held cart joined with the full product listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing is not cached and cannot be fetched.
    pub async fn cart_view(&self) -> Result<CartView, CatalogError> {
        let listing = self.inner.catalog.listing().await?;
        Ok(CartView::build(&self.inner.cart.snapshot(), &listing))
    }

    /// Order details for the held cart.
    ///
    /// # Errors
    ///
    /// See [`cart_view`](Self::cart_view).
    pub async fn checkout_summary(&self) -> Result<CheckoutSummary, CatalogError> {
        Ok(CheckoutSummary::from(&self.cart_view().await?))
    }

    /// Forget the held cart and the visitor's Sentry identity.
    ///
    /// The caller drops its [`Session`](crate::session::Session); the
    /// backend keeps the cart for the next login.
    pub async fn logout(&self) {
        self.inner.cart.reset().await;
        clear_sentry_user();
    }
}
