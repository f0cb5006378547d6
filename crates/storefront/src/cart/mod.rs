//! Cart mutation coordinator.
//!
//! The single write path for a session's cart. The held record set is an
//! immutable [`CartSnapshot`]; every backend response replaces it wholesale.
//!
//! # Ordering
//!
//! Writes pass through a FIFO write gate and reach the backend one at a time,
//! so responses are applied in the order requests were issued. The duplicate
//! check and the stepper's `qty ± 1` are evaluated once a request reaches the
//! head of the queue, against the latest applied records.
//!
//! # Failure
//!
//! A failed write leaves the held records untouched. Callers surface
//! [`CartError::user_message`] and stay interactive.

mod view;

pub use view::{CartItemView, CartView, CheckoutSummary, EMPTY_CART_MESSAGE};

use std::sync::{Arc, PoisonError, RwLock};

use qkart_core::{CartRecord, ProductId, contains_product};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::backend::BackendClient;
use crate::error::{CartError, add_breadcrumb};
use crate::session::Session;

/// Whether a quantity change may target a product that is already in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// "Add to cart" from a listing: fail with [`CartError::DuplicateItem`]
    /// if the product already has a record.
    Reject,
    /// Quantity stepper and explicit set.
    Allow,
}

/// A consistent view of the held cart records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSnapshot {
    records: Arc<[CartRecord]>,
    revision: u64,
}

impl CartSnapshot {
    /// Records in the order the backend returned them.
    #[must_use]
    pub fn records(&self) -> &[CartRecord] {
        &self.records
    }

    /// Number of record sets applied since the coordinator was created.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Quantity held for `product_id`, if it is in the cart.
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> Option<u32> {
        self.records
            .iter()
            .find(|record| &record.product_id == product_id)
            .map(|record| record.quantity)
    }

    /// Whether the cart holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Coordinates every write to a session's cart.
///
/// Cheap to clone; clones share the held records and the write gate.
#[derive(Clone)]
pub struct MutationCoordinator {
    inner: Arc<MutationCoordinatorInner>,
}

struct MutationCoordinatorInner {
    backend: BackendClient,
    state: RwLock<CartSnapshot>,
    write_gate: Mutex<()>,
}

impl MutationCoordinator {
    /// Create a coordinator with an empty cart.
    #[must_use]
    pub fn new(backend: BackendClient) -> Self {
        Self {
            inner: Arc::new(MutationCoordinatorInner {
                backend,
                state: RwLock::new(CartSnapshot::default()),
                write_gate: Mutex::new(()),
            }),
        }
    }

    /// The held records. Never observes a partially applied set.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Set the quantity of `product_id` to `quantity`. Quantity 0 removes it.
    ///
    /// # Errors
    ///
    /// - [`CartError::AuthRequired`] if `session` is `None` (no request is
    ///   made) or the backend rejects the token
    /// - [`CartError::DuplicateItem`] if `policy` is
    ///   [`DuplicatePolicy::Reject`] and the product is already in the cart
    ///   (no request is made)
    /// - [`CartError::NotFound`] if the backend does not know the product
    /// - [`CartError::Network`] on transport or backend failure
    #[instrument(skip(self, session), fields(product_id = %product_id))]
    pub async fn request_quantity_change(
        &self,
        session: Option<&Session>,
        product_id: &ProductId,
        quantity: u32,
        policy: DuplicatePolicy,
    ) -> Result<CartSnapshot, CartError> {
        self.mutate(session, product_id, policy, |_| Some(quantity))
            .await
    }

    /// "Add to cart" from a listing: quantity 1, duplicates rejected.
    ///
    /// # Errors
    ///
    /// See [`request_quantity_change`](Self::request_quantity_change).
    pub async fn add_to_cart(
        &self,
        session: Option<&Session>,
        product_id: &ProductId,
    ) -> Result<CartSnapshot, CartError> {
        self.request_quantity_change(session, product_id, 1, DuplicatePolicy::Reject)
            .await
    }

    /// Stepper `+`: one more unit than the latest applied quantity.
    ///
    /// # Errors
    ///
    /// See [`request_quantity_change`](Self::request_quantity_change).
    #[instrument(skip(self, session), fields(product_id = %product_id))]
    pub async fn increment(
        &self,
        session: Option<&Session>,
        product_id: &ProductId,
    ) -> Result<CartSnapshot, CartError> {
        self.mutate(session, product_id, DuplicatePolicy::Allow, |held| {
            Some(held.unwrap_or(0).saturating_add(1))
        })
        .await
    }

    /// Stepper `-`: one unit fewer than the latest applied quantity.
    ///
    /// Decrementing a quantity of 1 removes the product. Decrementing a
    /// product that is not in the cart changes nothing.
    ///
    /// # Errors
    ///
    /// See [`request_quantity_change`](Self::request_quantity_change).
    #[instrument(skip(self, session), fields(product_id = %product_id))]
    pub async fn decrement(
        &self,
        session: Option<&Session>,
        product_id: &ProductId,
    ) -> Result<CartSnapshot, CartError> {
        self.mutate(session, product_id, DuplicatePolicy::Allow, |held| {
            held.map(|quantity| quantity.saturating_sub(1))
        })
        .await
    }

    /// Load the session's cart from the backend, replacing the held records.
    ///
    /// # Errors
    ///
    /// - [`CartError::AuthRequired`] if `session` is `None` (no request is
    ///   made) or the backend rejects the token
    /// - [`CartError::Network`] on transport or backend failure
    #[instrument(skip(self, session))]
    pub async fn load_cart(&self, session: Option<&Session>) -> Result<CartSnapshot, CartError> {
        let session = session.ok_or(CartError::AuthRequired)?;

        let _gate = self.inner.write_gate.lock().await;

        let records = self
            .inner
            .backend
            .get_cart(session)
            .await
            .map_err(|e| CartError::from_backend(e, None))?;

        debug!(count = records.len(), "Loaded cart");
        Ok(self.apply(records))
    }

    /// Forget the held records, e.g. on logout.
    ///
    /// Waits for any in-flight write to land first.
    pub async fn reset(&self) -> CartSnapshot {
        let _gate = self.inner.write_gate.lock().await;
        info!("Clearing held cart");
        self.apply(Vec::new())
    }

    /// Run one write through the gate.
    ///
    /// `desired` maps the latest applied quantity of the product to the
    /// quantity to send; `None` means there is nothing to send.
    async fn mutate<F>(
        &self,
        session: Option<&Session>,
        product_id: &ProductId,
        policy: DuplicatePolicy,
        desired: F,
    ) -> Result<CartSnapshot, CartError>
    where
        F: FnOnce(Option<u32>) -> Option<u32>,
    {
        let session = session.ok_or(CartError::AuthRequired)?;

        let _gate = self.inner.write_gate.lock().await;
        let current = self.snapshot();

        if policy == DuplicatePolicy::Reject && contains_product(current.records(), product_id) {
            return Err(CartError::DuplicateItem {
                product_id: product_id.clone(),
            });
        }

        let Some(quantity) = desired(current.quantity_of(product_id)) else {
            debug!("Product not in cart, nothing to change");
            return Ok(current);
        };

        let quantity_text = quantity.to_string();
        add_breadcrumb(
            "cart",
            "Quantity change",
            Some(&[
                ("product_id", product_id.as_str()),
                ("quantity", quantity_text.as_str()),
            ]),
        );

        let records = self
            .inner
            .backend
            .upsert_cart(session, product_id, quantity)
            .await
            .map_err(|e| CartError::from_backend(e, Some(product_id)))?;

        debug!(quantity, count = records.len(), "Cart updated");
        Ok(self.apply(records))
    }

    /// Replace the held records. Callers hold the write gate.
    fn apply(&self, records: Vec<CartRecord>) -> CartSnapshot {
        let mut state = self
            .inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        *state = CartSnapshot {
            records: records.into(),
            revision: state.revision + 1,
        };
        state.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use url::Url;

    use super::*;
    use crate::config::StorefrontConfig;

    // Port 9 (discard) is never listened on in tests; any request would fail
    // with `CartError::Network`, so a guard error proves no request was made.
    fn coordinator() -> MutationCoordinator {
        let config = StorefrontConfig::new(Url::parse("http://127.0.0.1:9/").unwrap());
        MutationCoordinator::new(BackendClient::new(&config))
    }

    fn id(value: &str) -> ProductId {
        ProductId::parse(value).unwrap()
    }

    #[tokio::test]
    async fn test_missing_session_is_auth_required() {
        let cart = coordinator();

        let err = cart.add_to_cart(None, &id("A")).await.unwrap_err();
        assert!(matches!(err, CartError::AuthRequired));

        let err = cart.load_cart(None).await.unwrap_err();
        assert!(matches!(err, CartError::AuthRequired));

        assert_eq!(cart.snapshot().revision(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_add_is_rejected_locally() {
        let cart = coordinator();
        cart.apply(vec![CartRecord::new(id("A"), 2)]);

        let err = cart
            .request_quantity_change(Some(&Session::new("t")), &id("A"), 1, DuplicatePolicy::Reject)
            .await
            .unwrap_err();

        assert!(matches!(err, CartError::DuplicateItem { ref product_id } if product_id.as_str() == "A"));
        assert_eq!(cart.snapshot().quantity_of(&id("A")), Some(2));
    }

    #[tokio::test]
    async fn test_decrement_absent_item_is_noop() {
        let cart = coordinator();
        cart.apply(vec![CartRecord::new(id("A"), 1)]);
        let before = cart.snapshot();

        let after = cart
            .decrement(Some(&Session::new("t")), &id("B"))
            .await
            .unwrap();

        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_records() {
        let cart = coordinator();
        cart.apply(vec![CartRecord::new(id("A"), 1)]);

        let err = cart
            .increment(Some(&Session::new("t")), &id("A"))
            .await
            .unwrap_err();

        assert!(matches!(err, CartError::Network(_)));
        assert_eq!(cart.snapshot().quantity_of(&id("A")), Some(1));
        assert_eq!(cart.snapshot().revision(), 1);
    }

    #[tokio::test]
    async fn test_reset_clears_records() {
        let cart = coordinator();
        cart.apply(vec![CartRecord::new(id("A"), 3)]);

        let snapshot = cart.reset().await;

        assert!(snapshot.is_empty());
        assert_eq!(snapshot.revision(), 2);
        assert_eq!(cart.snapshot(), snapshot);
    }

    #[test]
    fn test_snapshot_quantity_lookup() {
        let cart = coordinator();
        let snapshot = cart.apply(vec![CartRecord::new(id("A"), 3), CartRecord::new(id("B"), 1)]);

        assert_eq!(snapshot.quantity_of(&id("B")), Some(1));
        assert_eq!(snapshot.quantity_of(&id("C")), None);
        assert_eq!(snapshot.records().len(), 2);
    }
}
