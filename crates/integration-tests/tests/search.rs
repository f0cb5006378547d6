//! Integration tests for the search debouncer against the fake backend.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use qkart_integration_tests::TestBackend;
use qkart_storefront::catalog::CatalogStore;
use qkart_storefront::backend::BackendClient;
use qkart_storefront::search::{SearchDebouncer, SearchView};
use tokio::sync::watch;
use tokio::time::timeout;

const WINDOW: Duration = Duration::from_millis(50);

fn debouncer(backend: &TestBackend) -> SearchDebouncer {
    debouncer_with_store(backend).0
}

fn debouncer_with_store(backend: &TestBackend) -> (SearchDebouncer, CatalogStore) {
    let mut config = backend.config();
    config.search_debounce = WINDOW;
    let store = CatalogStore::new(BackendClient::new(&config), &config);
    let search = SearchDebouncer::spawn(Arc::new(store.clone()), config.search_debounce);
    (search, store)
}

async fn wait_for_current(store: &CatalogStore, len: usize) {
    timeout(Duration::from_secs(5), async {
        while store.current().len() != len {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

async fn next_result(rx: &mut watch::Receiver<SearchView>) -> SearchView {
    timeout(
        Duration::from_secs(5),
        rx.wait_for(|view| *view != SearchView::Idle),
    )
    .await
    .unwrap()
    .unwrap()
    .clone()
}

#[tokio::test]
async fn test_typing_fires_one_search() {
    let backend = TestBackend::spawn().await.unwrap();
    let search = debouncer(&backend);
    let mut rx = search.subscribe();

    search.input("b");
    search.input("ba");
    search.input("bas");
    search.input("basket");

    let SearchView::Results(results) = next_result(&mut rx).await else {
        panic!("expected results");
    };
    assert_eq!(results.len(), 1);
    assert_eq!(results.products()[0].name, "Basketball");

    let queries: Vec<String> = backend
        .requests()
        .await
        .into_iter()
        .filter_map(|r| r.query)
        .collect();
    assert_eq!(queries, vec!["basket".to_string()]);
}

#[tokio::test]
async fn test_no_match_is_not_found() {
    let backend = TestBackend::spawn().await.unwrap();
    let search = debouncer(&backend);
    let mut rx = search.subscribe();

    search.input("spaceship");

    assert_eq!(next_result(&mut rx).await, SearchView::NotFound);
}

#[tokio::test]
async fn test_cleared_box_fires_nothing() {
    let backend = TestBackend::spawn().await.unwrap();
    let search = debouncer(&backend);

    search.input("phone");
    search.input("");
    tokio::time::sleep(WINDOW * 4).await;

    assert_eq!(search.view(), SearchView::Idle);
    assert!(backend.requests().await.is_empty());
}

#[tokio::test]
async fn test_unreachable_backend_fails_gracefully() {
    let backend = TestBackend::spawn().await.unwrap();
    let search = debouncer(&backend);
    let mut rx = search.subscribe();
    drop(backend);

    search.input("phone");

    assert!(matches!(
        next_result(&mut rx).await,
        SearchView::Failed { .. }
    ));
}

#[tokio::test]
async fn test_cleared_box_restores_full_listing() {
    let backend = TestBackend::spawn().await.unwrap();
    let (search, store) = debouncer_with_store(&backend);
    let mut rx = search.subscribe();

    search.input("phone");
    next_result(&mut rx).await;
    assert_eq!(store.current().len(), 1);

    search.input("");
    wait_for_current(&store, 4).await;
    assert_eq!(search.view(), SearchView::Idle);
}

#[tokio::test]
async fn test_search_in_flight_when_cleared_does_not_win() {
    let backend = TestBackend::spawn().await.unwrap();
    let (search, store) = debouncer_with_store(&backend);
    let mut held = backend.hold_next_search().await;

    search.input("phone");
    held.arrived().await;
    search.input("");
    wait_for_current(&store, 4).await;

    held.release();
    tokio::time::sleep(WINDOW * 4).await;

    assert_eq!(store.current().len(), 4);
    assert_eq!(search.view(), SearchView::Idle);
    assert_eq!(backend.request_count("GET", "/products/search").await, 1);
}
