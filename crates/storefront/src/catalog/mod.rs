//! Catalog store.
//!
//! Fetches the product listing (default or search-scoped) and holds the
//! catalog currently shown to the visitor. The default listing is cached with
//! `moka`; search results never are.
//!
//! Every fetch takes a ticket when it is issued. A response only replaces the
//! current catalog if its ticket is newer than the one that produced the
//! current catalog, so a slow response that has been overtaken by a newer one
//! is dropped. Failed fetches leave the current catalog untouched; the caller
//! decides whether to keep showing it or render an empty state.

mod cache;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use moka::future::Cache;
use qkart_core::Catalog;
use tracing::{debug, instrument};

use crate::backend::BackendClient;
use crate::config::StorefrontConfig;
use crate::error::CatalogError;

use cache::{CacheKey, build_cache};

/// Store for the product catalog.
///
/// Cheap to clone; clones share the cache and the current catalog.
#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<CatalogStoreInner>,
}

struct CatalogStoreInner {
    backend: BackendClient,
    cache: Cache<CacheKey, Catalog>,
    current: RwLock<CurrentCatalog>,
    issued: AtomicU64,
}

#[derive(Default)]
struct CurrentCatalog {
    ticket: u64,
    catalog: Catalog,
}

impl CatalogStore {
    /// Create a catalog store backed by `backend`.
    #[must_use]
    pub fn new(backend: BackendClient, config: &StorefrontConfig) -> Self {
        Self {
            inner: Arc::new(CatalogStoreInner {
                backend,
                cache: build_cache(config.catalog_cache_ttl),
                current: RwLock::new(CurrentCatalog::default()),
                issued: AtomicU64::new(0),
            }),
        }
    }

    /// Fetch the full product listing and make it the current catalog.
    ///
    /// Served from cache while the cached listing is fresh.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Network`] if the backend cannot be reached or
    /// answers with a failure. Nothing is retried.
    #[instrument(skip(self))]
    pub async fn fetch_catalog(&self) -> Result<Catalog, CatalogError> {
        let ticket = self.next_ticket();
        self.fetch_ticketed(ticket, "").await
    }

    /// The full product listing, without touching the current catalog.
    ///
    /// Cart views join against this so that a search never hides cart lines.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Network`] if the listing is not cached and the
    /// backend fetch fails.
    pub async fn listing(&self) -> Result<Catalog, CatalogError> {
        if let Some(catalog) = self.inner.cache.get(&CacheKey::Listing).await {
            debug!("Cache hit for product listing");
            return Ok(catalog);
        }

        let catalog = Catalog::new(self.inner.backend.get_products().await?);
        self.inner
            .cache
            .insert(CacheKey::Listing, catalog.clone())
            .await;

        Ok(catalog)
    }

    /// Fetch the product listing scoped by `query`.
    ///
    /// A blank query means "no filter" and behaves like
    /// [`fetch_catalog`](Self::fetch_catalog). An empty result is a success:
    /// callers render "no products found" for it, and a connectivity warning
    /// only for an `Err`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Network`] if the backend cannot be reached or
    /// answers with a failure. Nothing is retried.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search_catalog(&self, query: &str) -> Result<Catalog, CatalogError> {
        let ticket = self.next_ticket();
        self.fetch_ticketed(ticket, query.trim()).await
    }

    /// Start a [`search_catalog`](Self::search_catalog) whose ticket is taken
    /// now, not when the returned future is first polled.
    ///
    /// A search issued later therefore always supersedes this one, even if
    /// this future is spawned and only polled afterwards.
    pub(crate) fn issue_search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Catalog, CatalogError>> + Send + use<> {
        let store = self.clone();
        let query = query.trim().to_string();
        let ticket = self.next_ticket();
        async move { store.fetch_ticketed(ticket, &query).await }
    }

    /// The catalog currently shown to the visitor.
    #[must_use]
    pub fn current(&self) -> Catalog {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .catalog
            .clone()
    }

    /// Drop the cached default listing so the next fetch hits the backend.
    pub async fn invalidate(&self) {
        self.inner.cache.invalidate(&CacheKey::Listing).await;
    }

    /// Fetch the listing for a blank `query`, search results otherwise, and
    /// publish them under `ticket`.
    #[instrument(skip(self))]
    async fn fetch_ticketed(&self, ticket: u64, query: &str) -> Result<Catalog, CatalogError> {
        let catalog = if query.is_empty() {
            self.listing().await?
        } else {
            Catalog::new(self.inner.backend.search_products(query).await?)
        };
        self.publish(ticket, &catalog);
        Ok(catalog)
    }

    fn next_ticket(&self) -> u64 {
        self.inner.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Replace the current catalog if `ticket` is newer than the one that
    /// produced it. Returns whether the catalog was replaced.
    fn publish(&self, ticket: u64, catalog: &Catalog) -> bool {
        let mut current = self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if ticket <= current.ticket {
            debug!(
                ticket,
                current_ticket = current.ticket,
                "Discarding stale catalog response"
            );
            return false;
        }

        current.ticket = ticket;
        current.catalog = catalog.clone();
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use qkart_core::{Price, Product, ProductId, Rating};
    use rust_decimal::Decimal;
    use url::Url;

    use super::*;

    fn store() -> CatalogStore {
        // Nothing in these tests reaches the network.
        let config = StorefrontConfig::new(Url::parse("http://127.0.0.1:9/").unwrap());
        CatalogStore::new(BackendClient::new(&config), &config)
    }

    fn catalog(ids: &[&str]) -> Catalog {
        ids.iter()
            .map(|id| Product {
                id: ProductId::parse(id).unwrap(),
                name: (*id).to_string(),
                category: "Sports".to_string(),
                cost: Price::positive(Decimal::ONE).unwrap(),
                rating: Rating::new(3).unwrap(),
                image: String::new(),
            })
            .collect()
    }

    #[test]
    fn test_starts_empty() {
        assert!(store().current().is_empty());
    }

    #[test]
    fn test_newer_ticket_replaces_current() {
        let store = store();
        let first = store.next_ticket();
        let second = store.next_ticket();

        assert!(store.publish(first, &catalog(&["a"])));
        assert!(store.publish(second, &catalog(&["b"])));

        assert_eq!(store.current(), catalog(&["b"]));
    }

    #[test]
    fn test_late_response_is_discarded() {
        let store = store();
        let slow = store.next_ticket();
        let fast = store.next_ticket();

        assert!(store.publish(fast, &catalog(&["fast"])));
        assert!(!store.publish(slow, &catalog(&["slow"])));

        assert_eq!(store.current(), catalog(&["fast"]));
    }

    #[test]
    fn test_issued_search_takes_ticket_before_polling() {
        let store = store();

        let pending = store.issue_search("phone");
        let later = store.next_ticket();
        assert_eq!(later, 2);

        assert!(store.publish(later, &catalog(&["listing"])));
        drop(pending);
        assert!(!store.publish(1, &catalog(&["phone"])));
        assert_eq!(store.current(), catalog(&["listing"]));
    }

    #[test]
    fn test_clones_share_current_catalog() {
        let store = store();
        let other = store.clone();

        let ticket = other.next_ticket();
        other.publish(ticket, &catalog(&["shared"]));

        assert_eq!(store.current(), catalog(&["shared"]));
    }
}
