//! Interactive search box fed from stdin.
//!
//! Every line is treated as the full contents of the search box after an
//! edit, so typing `a`, `ap`, `app` on three lines quickly fires one search.
//! A blank line clears the search and shows the full listing again.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::timeout;

use qkart_core::Catalog;
use qkart_storefront::search::SearchView;

use super::{CommandError, Context};
use crate::output;

/// How long to keep waiting for results after stdin closes, beyond the
/// quiet window.
const SETTLE: Duration = Duration::from_secs(5);

pub async fn browse(ctx: &Context) -> Result<(), CommandError> {
    let listing = ctx.storefront.catalog().fetch_catalog().await?;
    output::catalog(&listing);

    let debouncer = ctx.storefront.search_debouncer();
    let mut view = debouncer.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(text) => debouncer.input(text),
                None => break,
            },
            changed = view.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let current = view.borrow_and_update().clone();
                show(&current, &listing);
            }
        }
    }

    let settle = ctx.storefront.config().search_debounce + SETTLE;
    while let Ok(Ok(())) = timeout(settle, view.changed()).await {
        let current = view.borrow_and_update().clone();
        show(&current, &listing);
    }

    Ok(())
}

fn show(view: &SearchView, listing: &Catalog) {
    if *view == SearchView::Idle {
        output::catalog(listing);
    } else {
        output::search_view(view);
    }
}
