//! Cache types for catalog listings.

use std::time::Duration;

use moka::future::Cache;
use qkart_core::Catalog;

/// Upper bound on cached listings.
const MAX_CACHED_LISTINGS: u64 = 16;

/// Cache key for catalog listings.
///
/// Only the default listing is cached; search results always go to the
/// backend.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Listing,
}

/// Build the listing cache with the configured time-to-live.
pub fn build_cache(ttl: Duration) -> Cache<CacheKey, Catalog> {
    Cache::builder()
        .max_capacity(MAX_CACHED_LISTINGS)
        .time_to_live(ttl)
        .build()
}
