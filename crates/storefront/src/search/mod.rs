//! Debounced catalog search.
//!
//! [`SearchDebouncer`] runs a [`Debouncer`] on a background task. Search-box
//! contents go in through [`SearchDebouncer::input`]; the outcome comes out as
//! a [`SearchView`] on a `watch` channel.
//!
//! Fired searches run concurrently. Each carries a ticket, and a result is
//! only published if it is newer than the last published one, so a slow
//! response for an old query never overwrites a newer result. Clearing the
//! search box also discards every search still in flight, and once a search
//! has fired it asks for the full listing again so the catalog store stops
//! holding search results.

mod debounce;

pub use debounce::{DebounceState, Debouncer, InputOutcome};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use qkart_core::Catalog;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, instrument};

use crate::catalog::CatalogStore;
use crate::error::{CatalogError, report};

/// Something that can run a catalog search.
pub trait CatalogSearch: Send + Sync + 'static {
    /// Search the catalog for `query`. A blank query asks for the full
    /// listing.
    ///
    /// The search counts as issued when this is called, so a search issued
    /// later supersedes it even if the returned future is polled first.
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Catalog, CatalogError>> + Send + 'static;
}

impl CatalogSearch for CatalogStore {
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Catalog, CatalogError>> + Send + 'static {
        self.issue_search(query)
    }
}

/// What the search area should show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchView {
    /// The search box is empty; show the unfiltered catalog.
    #[default]
    Idle,
    /// Products matching the latest query.
    Results(Catalog),
    /// The latest query matched nothing.
    NotFound,
    /// The latest query failed.
    Failed {
        /// Message safe to show to the visitor.
        message: String,
    },
}

impl SearchView {
    fn from_result(result: Result<Catalog, CatalogError>) -> Self {
        match result {
            Ok(catalog) if catalog.is_empty() => Self::NotFound,
            Ok(catalog) => Self::Results(catalog),
            Err(e) => {
                report(&e);
                Self::Failed {
                    message: e.user_message().to_string(),
                }
            }
        }
    }
}

/// Handle to a running search debouncer.
///
/// Dropping the handle stops the background task.
pub struct SearchDebouncer {
    input: mpsc::UnboundedSender<String>,
    view: watch::Receiver<SearchView>,
    task: JoinHandle<()>,
}

impl SearchDebouncer {
    /// Start a debouncer that fires `search` after `window` of quiet.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn<S: CatalogSearch>(search: Arc<S>, window: Duration) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(SearchView::Idle);

        let task = tokio::spawn(run(search, window, input_rx, view_tx));

        Self {
            input: input_tx,
            view: view_rx,
            task,
        }
    }

    /// Report the full current contents of the search box.
    pub fn input(&self, text: impl Into<String>) {
        if self.input.send(text.into()).is_err() {
            debug!("Search debouncer has stopped; dropping input");
        }
    }

    /// Subscribe to view changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.view.clone()
    }

    /// The current view.
    #[must_use]
    pub fn view(&self) -> SearchView {
        self.view.borrow().clone()
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

type Landed = (u64, Result<Catalog, CatalogError>);

#[instrument(skip_all)]
async fn run<S: CatalogSearch>(
    search: Arc<S>,
    window: Duration,
    mut input: mpsc::UnboundedReceiver<String>,
    view: watch::Sender<SearchView>,
) {
    let mut debouncer = Debouncer::new(window);
    let (landed_tx, mut landed_rx) = mpsc::unbounded_channel::<Landed>();
    let mut issued: u64 = 0;
    let mut published: u64 = 0;
    // A search has fired since the box was last cleared.
    let mut searched = false;

    loop {
        let deadline = debouncer.deadline();

        tokio::select! {
            text = input.recv() => {
                let Some(text) = text else { break };
                if debouncer.on_input(&text, Instant::now()) == InputOutcome::Cleared {
                    published = issued;
                    view.send_replace(SearchView::Idle);

                    if std::mem::take(&mut searched) {
                        // Put the full listing back behind any search still in flight.
                        let listing = search.search("");
                        tokio::spawn(async move {
                            if let Err(e) = listing.await {
                                report(&e);
                            }
                        });
                    }
                }
            }
            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(query) = debouncer.poll(Instant::now()) {
                    issued += 1;
                    let ticket = issued;
                    debug!(ticket, query = %query, "Firing search");

                    searched = true;
                    let pending = search.search(&query);
                    let landed = landed_tx.clone();
                    tokio::spawn(async move {
                        let result = pending.await;
                        // The receiver is gone once the debouncer stops.
                        let _ = landed.send((ticket, result));
                    });
                }
            }
            Some((ticket, result)) = landed_rx.recv() => {
                if ticket <= published {
                    debug!(ticket, published, "Discarding superseded search result");
                    continue;
                }
                published = ticket;
                view.send_replace(SearchView::from_result(result));
            }
        }
    }

    debug!("Search input closed");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use qkart_core::{Price, Product, ProductId, Rating};
    use reqwest::StatusCode;
    use rust_decimal::Decimal;

    use super::*;
    use crate::backend::BackendError;

    const WINDOW: Duration = Duration::from_millis(500);

    /// Search backend with per-query latency and recorded calls.
    #[derive(Default)]
    struct FakeSearch {
        calls: Mutex<Vec<(String, Instant)>>,
    }

    impl FakeSearch {
        fn queries(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(q, _)| q.clone())
                .collect()
        }
    }

    fn catalog_for(query: &str) -> Catalog {
        Catalog::new(vec![Product {
            id: ProductId::parse(query).unwrap(),
            name: query.to_string(),
            category: "Sports".to_string(),
            cost: Price::positive(Decimal::TEN).unwrap(),
            rating: Rating::new(5).unwrap(),
            image: String::new(),
        }])
    }

    impl CatalogSearch for FakeSearch {
        fn search(
            &self,
            query: &str,
        ) -> impl Future<Output = Result<Catalog, CatalogError>> + Send + 'static {
            let query = query.to_string();
            self.calls
                .lock()
                .unwrap()
                .push((query.clone(), Instant::now()));

            let delay = if query == "slow" {
                Duration::from_secs(2)
            } else {
                Duration::from_millis(100)
            };

            async move {
                tokio::time::sleep(delay).await;
                match query.as_str() {
                    "" => Ok(catalog_for("listing")),
                    "zzz" => Ok(Catalog::empty()),
                    "boom" => Err(CatalogError::Network(BackendError::Status {
                        status: StatusCode::INTERNAL_SERVER_ERROR,
                        message: None,
                    })),
                    _ => Ok(catalog_for(&query)),
                }
            }
        }
    }

    async fn wait_for_results(rx: &mut watch::Receiver<SearchView>) -> SearchView {
        rx.wait_for(|view| *view != SearchView::Idle)
            .await
            .unwrap()
            .clone()
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystrokes_coalesce_into_one_search() {
        let fake = Arc::new(FakeSearch::default());
        let debouncer = SearchDebouncer::spawn(Arc::clone(&fake), WINDOW);
        let mut rx = debouncer.subscribe();
        let start = Instant::now();

        debouncer.input("a");
        tokio::time::sleep(Duration::from_millis(40)).await;
        debouncer.input("ap");
        tokio::time::sleep(Duration::from_millis(40)).await;
        debouncer.input("app");

        tokio::time::sleep(Duration::from_millis(490)).await;
        assert!(fake.queries().is_empty());

        let view = wait_for_results(&mut rx).await;
        assert_eq!(view, SearchView::Results(catalog_for("app")));

        let calls = fake.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "app");
        let fired_after = calls[0].1 - start;
        assert!(fired_after >= Duration::from_millis(580));
        assert!(fired_after < Duration::from_millis(590));
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_input_cancels_and_clears() {
        let fake = Arc::new(FakeSearch::default());
        let debouncer = SearchDebouncer::spawn(Arc::clone(&fake), WINDOW);
        let mut rx = debouncer.subscribe();

        debouncer.input("zzz");
        assert_eq!(wait_for_results(&mut rx).await, SearchView::NotFound);

        debouncer.input("ab");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.input("");
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(debouncer.view(), SearchView::Idle);
        assert_eq!(fake.queries(), vec!["zzz".to_string(), String::new()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_requests_listing_once() {
        let fake = Arc::new(FakeSearch::default());
        let debouncer = SearchDebouncer::spawn(Arc::clone(&fake), WINDOW);

        debouncer.input("slow");
        tokio::time::sleep(Duration::from_millis(600)).await;
        debouncer.input("");
        debouncer.input(" ");
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(debouncer.view(), SearchView::Idle);
        assert_eq!(fake.queries(), vec!["slow".to_string(), String::new()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_before_any_search_requests_nothing() {
        let fake = Arc::new(FakeSearch::default());
        let debouncer = SearchDebouncer::spawn(Arc::clone(&fake), WINDOW);

        debouncer.input("ab");
        debouncer.input("");
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(fake.queries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_in_flight_result_is_discarded() {
        let fake = Arc::new(FakeSearch::default());
        let debouncer = SearchDebouncer::spawn(Arc::clone(&fake), WINDOW);
        let mut rx = debouncer.subscribe();

        debouncer.input("slow");
        tokio::time::sleep(Duration::from_millis(600)).await;
        debouncer.input("fast");

        let view = wait_for_results(&mut rx).await;
        assert_eq!(view, SearchView::Results(catalog_for("fast")));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(debouncer.view(), SearchView::Results(catalog_for("fast")));
        assert_eq!(fake.queries(), vec!["slow".to_string(), "fast".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_shows_connectivity_message() {
        let fake = Arc::new(FakeSearch::default());
        let debouncer = SearchDebouncer::spawn(Arc::clone(&fake), WINDOW);
        let mut rx = debouncer.subscribe();

        debouncer.input("boom");

        let view = wait_for_results(&mut rx).await;
        assert_eq!(
            view,
            SearchView::Failed {
                message: crate::error::CONNECTIVITY_MESSAGE.to_string()
            }
        );
    }
}
