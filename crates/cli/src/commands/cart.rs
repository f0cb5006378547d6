//! Cart commands.
//!
//! Each invocation is a fresh process, so the session's cart is loaded from
//! the backend before any change is made.

use qkart_storefront::cart::{CheckoutSummary, DuplicatePolicy};
use qkart_storefront::error::add_breadcrumb;
use tracing::info;

use super::{CommandError, Context, parse_product_id};
use crate::output;

async fn load(ctx: &Context) -> Result<(), CommandError> {
    ctx.storefront.cart().load_cart(ctx.session()).await?;
    Ok(())
}

async fn print_cart(ctx: &Context) -> Result<(), CommandError> {
    output::cart(&ctx.storefront.cart_view().await?);
    Ok(())
}

/// Print the cart.
pub async fn show(ctx: &Context) -> Result<(), CommandError> {
    load(ctx).await?;
    print_cart(ctx).await
}

/// "Add to cart" from the listing.
pub async fn add(ctx: &Context, product_id: &str) -> Result<(), CommandError> {
    let product_id = parse_product_id(product_id)?;
    add_breadcrumb("cart", "Add to cart", Some(&[("product_id", product_id.as_str())]));

    load(ctx).await?;
    ctx.storefront
        .cart()
        .add_to_cart(ctx.session(), &product_id)
        .await?;

    info!(product_id = %product_id, "Added to cart");
    print_cart(ctx).await
}

/// Quantity stepper `+`.
pub async fn increment(ctx: &Context, product_id: &str) -> Result<(), CommandError> {
    let product_id = parse_product_id(product_id)?;

    load(ctx).await?;
    ctx.storefront
        .cart()
        .increment(ctx.session(), &product_id)
        .await?;

    print_cart(ctx).await
}

/// Quantity stepper `-`.
pub async fn decrement(ctx: &Context, product_id: &str) -> Result<(), CommandError> {
    let product_id = parse_product_id(product_id)?;

    load(ctx).await?;
    ctx.storefront
        .cart()
        .decrement(ctx.session(), &product_id)
        .await?;

    print_cart(ctx).await
}

/// Set an explicit quantity. 0 removes the product.
pub async fn set(ctx: &Context, product_id: &str, quantity: u32) -> Result<(), CommandError> {
    let product_id = parse_product_id(product_id)?;

    load(ctx).await?;
    ctx.storefront
        .cart()
        .request_quantity_change(ctx.session(), &product_id, quantity, DuplicatePolicy::Allow)
        .await?;

    print_cart(ctx).await
}

/// Print the order details.
pub async fn checkout(ctx: &Context) -> Result<(), CommandError> {
    load(ctx).await?;

    let view = ctx.storefront.cart_view().await?;
    output::cart(&view);
    if !view.is_empty {
        output::checkout(&CheckoutSummary::from(&view));
    }
    Ok(())
}
