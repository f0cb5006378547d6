//! Terminal rendering.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use qkart_core::{Catalog, Product};
use qkart_storefront::cart::{CartView, CheckoutSummary, EMPTY_CART_MESSAGE};
use qkart_storefront::search::SearchView;

pub fn failure(message: &str) {
    eprintln!("error: {message}");
}

pub fn catalog(catalog: &Catalog) {
    if catalog.is_empty() {
        println!("No products found");
        return;
    }
    for product in catalog {
        print_product(product);
    }
}

fn print_product(product: &Product) {
    println!(
        "{:<18} {:<36} {:<12} {:>10}  {}",
        product.id,
        product.name,
        product.category,
        product.cost.to_string(),
        stars(product.rating.stars()),
    );
}

fn stars(filled: u8) -> String {
    (1..=qkart_core::Rating::MAX)
        .map(|n| if n <= filled { '*' } else { '.' })
        .collect()
}

pub fn search_view(view: &SearchView) {
    match view {
        SearchView::Idle => println!("(search cleared)"),
        SearchView::Results(results) => catalog(results),
        SearchView::NotFound => println!("No products found"),
        SearchView::Failed { message } => failure(message),
    }
}

pub fn cart(view: &CartView) {
    if view.is_empty {
        println!("{EMPTY_CART_MESSAGE}");
        return;
    }
    for item in &view.items {
        println!(
            "{:<18} {:<36} {:>4} x {:>10} = {:>10}",
            item.product_id,
            item.name,
            item.quantity,
            item.price.to_string(),
            item.line_price.to_string(),
        );
    }
    println!("Total: {} ({} items)", view.subtotal, view.item_count);
}

pub fn checkout(summary: &CheckoutSummary) {
    println!();
    println!("Order Details");
    println!("  Products          {}", summary.products);
    println!("  Subtotal          {}", summary.subtotal);
    println!("  Shipping Charges  {}", summary.shipping);
    println!("  Total             {}", summary.total);
}
