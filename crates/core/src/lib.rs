//! QKart Core - Shared types and cart reconciliation.
//!
//! This crate provides the domain model used across all QKart components:
//! - `storefront` - Backend client, catalog store, cart coordinator, search debouncer
//! - `cli` - Command-line storefront client
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no clocks. Everything here is synchronous and never fails at
//! runtime once values have been constructed.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices, ratings, plus the
//!   product and cart entities
//! - [`reconcile`] - Merging cart records with the catalog into cart items,
//!   and the cart aggregates

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod reconcile;
pub mod types;

pub use reconcile::{contains_product, reconcile, total_quantity, total_value};
pub use types::*;
