//! Integration tests for QKart.
//!
//! [`TestBackend`] is an in-process fake of the QKart backend REST API, served
//! by axum on an ephemeral local port. It records every request it receives,
//! so tests can assert that a guard fired without touching the network.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p qkart-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = TestBackend::spawn().await?;
//! let session = backend.add_session("token").await;
//! let storefront = backend.storefront();
//!
//! storefront.cart().add_to_cart(Some(&session), &product_id("p1")).await?;
//! assert_eq!(backend.cart("token").await, vec![("p1".to_string(), 1)]);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use qkart_core::ProductId;
use qkart_storefront::Storefront;
use qkart_storefront::config::StorefrontConfig;
use qkart_storefront::session::Session;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use url::Url;

/// A request the fake backend received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: &'static str,
    /// `value` query parameter of a search.
    pub query: Option<String>,
    /// `(productId, qty)` of a cart update.
    pub update: Option<(String, u32)>,
}

/// Wire JSON for a product.
#[must_use]
pub fn product_json(id: &str, name: &str, category: &str, cost: i64, rating: u8) -> Value {
    json!({
        "name": name,
        "category": category,
        "cost": cost,
        "rating": rating,
        "image": format!("https://i.imgur.com/{id}.jpg"),
        "_id": id,
    })
}

/// Products every fresh backend starts with.
#[must_use]
pub fn default_products() -> Vec<Value> {
    vec![
        product_json("p1", "iPhone XR", "Phones", 100, 4),
        product_json("p2", "Basketball", "Sports", 50, 5),
        product_json("p3", "YONEX Smash Badminton Racquet", "Sports", 100, 5),
        product_json("p4", "Tan Leatherette Weekender Duffle", "Fashion", 150, 4),
    ]
}

/// Parse a product ID in a test.
///
/// # Panics
///
/// Panics if `id` is blank.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn product_id(id: &str) -> ProductId {
    ProductId::parse(id).unwrap()
}

#[derive(Default)]
struct Store {
    products: Vec<Value>,
    carts: HashMap<String, Vec<(String, u32)>>,
    requests: Vec<RecordedRequest>,
    fail_products: bool,
    malformed_products: bool,
    malformed_cart_updates: bool,
    held_update: Option<HoldSlot>,
    held_search: Option<HoldSlot>,
}

impl Store {
    fn product_exists(&self, id: &str) -> bool {
        self.products
            .iter()
            .any(|product| product.get("_id").and_then(Value::as_str) == Some(id))
    }
}

struct HoldSlot {
    arrived: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

type SharedStore = Arc<Mutex<Store>>;

/// A request parked inside the fake backend.
///
/// Created by [`TestBackend::hold_next_cart_update`] or
/// [`TestBackend::hold_next_search`]. The held request waits after being
/// recorded until [`release`](Self::release) is called or this handle is
/// dropped.
pub struct HeldRequest {
    arrived: oneshot::Receiver<()>,
    release: oneshot::Sender<()>,
}

impl HeldRequest {
    /// Wait until the held request has reached the backend.
    pub async fn arrived(&mut self) {
        // A dropped sender means the backend shut down; nothing to wait for.
        let _ = (&mut self.arrived).await;
    }

    /// Let the held request complete.
    pub fn release(self) {
        let _ = self.release.send(());
    }
}

/// In-process fake of the QKart backend.
pub struct TestBackend {
    addr: SocketAddr,
    store: SharedStore,
    task: JoinHandle<()>,
}

impl TestBackend {
    /// Start a backend seeded with [`default_products`] on `127.0.0.1:0`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn spawn() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let store = Arc::new(Mutex::new(Store {
            products: default_products(),
            ..Store::default()
        }));

        let app = Router::new()
            .route("/products", get(list_products))
            .route("/products/search", get(search_products))
            .route("/cart", get(get_cart).post(update_cart))
            .with_state(Arc::clone(&store));

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, store, task })
    }

    /// Base URL of the backend.
    ///
    /// # Panics
    ///
    /// Never; a socket address always forms a valid URL.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).unwrap()
    }

    /// Storefront configuration pointing at this backend.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig::new(self.url())
    }

    /// A fresh storefront talking to this backend.
    #[must_use]
    pub fn storefront(&self) -> Storefront {
        Storefront::new(self.config())
    }

    /// Replace the product listing.
    pub async fn set_products(&self, products: Vec<Value>) {
        self.store.lock().await.products = products;
    }

    /// Make `GET /products` answer `500`.
    pub async fn fail_products(&self, fail: bool) {
        self.store.lock().await.fail_products = fail;
    }

    /// Make `GET /products` answer `200` with a body that is not JSON.
    pub async fn malform_products(&self, malformed: bool) {
        self.store.lock().await.malformed_products = malformed;
    }

    /// Make `POST /cart` answer `200` with JSON that is not a cart.
    ///
    /// The update is still applied to the stored cart.
    pub async fn malform_cart_updates(&self, malformed: bool) {
        self.store.lock().await.malformed_cart_updates = malformed;
    }

    /// Register a logged-in user with an empty cart.
    pub async fn add_session(&self, token: &str) -> Session {
        self.store
            .lock()
            .await
            .carts
            .entry(token.to_string())
            .or_default();
        Session::new(token)
    }

    /// Replace the cart of a registered user.
    pub async fn set_cart(&self, token: &str, entries: &[(&str, u32)]) {
        self.store.lock().await.carts.insert(
            token.to_string(),
            entries
                .iter()
                .map(|(id, qty)| ((*id).to_string(), *qty))
                .collect(),
        );
    }

    /// The cart of a user as the backend holds it.
    pub async fn cart(&self, token: &str) -> Vec<(String, u32)> {
        self.store
            .lock()
            .await
            .carts
            .get(token)
            .cloned()
            .unwrap_or_default()
    }

    /// Every request received so far, in arrival order.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.store.lock().await.requests.clone()
    }

    /// Number of requests received for `method` and `path`.
    pub async fn request_count(&self, method: &str, path: &str) -> usize {
        self.store
            .lock()
            .await
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Park the next `POST /cart` until the returned handle releases it.
    pub async fn hold_next_cart_update(&self) -> HeldRequest {
        let (slot, held) = hold();
        self.store.lock().await.held_update = Some(slot);
        held
    }

    /// Park the next `GET /products/search` until the returned handle
    /// releases it.
    pub async fn hold_next_search(&self) -> HeldRequest {
        let (slot, held) = hold();
        self.store.lock().await.held_search = Some(slot);
        held
    }
}

fn hold() -> (HoldSlot, HeldRequest) {
    let (arrived_tx, arrived_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel();

    (
        HoldSlot {
            arrived: arrived_tx,
            release: release_rx,
        },
        HeldRequest {
            arrived: arrived_rx,
            release: release_tx,
        },
    )
}

impl HoldSlot {
    async fn wait(self) {
        let _ = self.arrived.send(());
        let _ = self.release.await;
    }
}

impl Drop for TestBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn cart_body(entries: &[(String, u32)]) -> Response {
    let body: Vec<Value> = entries
        .iter()
        .map(|(id, qty)| json!({ "productId": id, "qty": qty }))
        .collect();
    Json(body).into_response()
}

async fn list_products(State(store): State<SharedStore>) -> Response {
    let mut store = store.lock().await;
    store.requests.push(RecordedRequest {
        method: "GET",
        path: "/products",
        query: None,
        update: None,
    });

    if store.fail_products {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong");
    }
    if store.malformed_products {
        return (StatusCode::OK, "<html>Service Unavailable</html>").into_response();
    }
    Json(store.products.clone()).into_response()
}

async fn search_products(
    State(store): State<SharedStore>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let value = params.get("value").cloned().unwrap_or_default();
    let held = {
        let mut store = store.lock().await;
        store.requests.push(RecordedRequest {
            method: "GET",
            path: "/products/search",
            query: Some(value.clone()),
            update: None,
        });
        store.held_search.take()
    };

    if let Some(slot) = held {
        slot.wait().await;
    }

    let store = store.lock().await;
    let needle = value.to_lowercase();
    let matches: Vec<Value> = store
        .products
        .iter()
        .filter(|product| {
            ["name", "category"].iter().any(|field| {
                product
                    .get(field)
                    .and_then(Value::as_str)
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
        })
        .cloned()
        .collect();

    if matches.is_empty() {
        return (StatusCode::NOT_FOUND, Json(Vec::<Value>::new())).into_response();
    }
    Json(matches).into_response()
}

async fn get_cart(State(store): State<SharedStore>, headers: HeaderMap) -> Response {
    let mut store = store.lock().await;
    store.requests.push(RecordedRequest {
        method: "GET",
        path: "/cart",
        query: None,
        update: None,
    });

    match bearer(&headers).and_then(|token| store.carts.get(&token)) {
        Some(entries) => cart_body(entries),
        None => failure(
            StatusCode::UNAUTHORIZED,
            "Protected route, Oauth2 Bearer token not found",
        ),
    }
}

#[derive(Deserialize)]
struct CartUpdate {
    #[serde(rename = "productId")]
    product_id: String,
    qty: u32,
}

async fn update_cart(
    State(store): State<SharedStore>,
    headers: HeaderMap,
    Json(update): Json<CartUpdate>,
) -> Response {
    let held = {
        let mut store = store.lock().await;
        store.requests.push(RecordedRequest {
            method: "POST",
            path: "/cart",
            query: None,
            update: Some((update.product_id.clone(), update.qty)),
        });
        store.held_update.take()
    };

    if let Some(slot) = held {
        slot.wait().await;
    }

    let mut store = store.lock().await;

    let Some(token) = bearer(&headers).filter(|token| store.carts.contains_key(token)) else {
        return failure(
            StatusCode::UNAUTHORIZED,
            "Protected route, Oauth2 Bearer token not found",
        );
    };

    if !store.product_exists(&update.product_id) {
        return failure(StatusCode::NOT_FOUND, "Product doesn't exist");
    }

    let malformed = store.malformed_cart_updates;
    let cart = store.carts.entry(token).or_default();
    if update.qty == 0 {
        cart.retain(|(id, _)| id != &update.product_id);
    } else if let Some(entry) = cart.iter_mut().find(|(id, _)| id == &update.product_id) {
        entry.1 = update.qty;
    } else {
        cart.push((update.product_id, update.qty));
    }

    if malformed {
        return Json(json!({ "unexpected": true })).into_response();
    }
    cart_body(cart)
}
