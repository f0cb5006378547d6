//! Product listing and one-shot search.

use tracing::info;

use super::{CommandError, Context};
use crate::output;

/// Print the full product listing.
pub async fn products(ctx: &Context) -> Result<(), CommandError> {
    let catalog = ctx.storefront.catalog().fetch_catalog().await?;
    info!(count = catalog.len(), "Fetched products");
    output::catalog(&catalog);
    Ok(())
}

/// Print the products matching `query`. A blank query lists everything.
pub async fn search(ctx: &Context, query: &str) -> Result<(), CommandError> {
    let catalog = ctx.storefront.catalog().search_catalog(query).await?;
    info!(query, count = catalog.len(), "Searched products");
    output::catalog(&catalog);
    Ok(())
}
