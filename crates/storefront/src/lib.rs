//! QKart storefront client engine.
//!
//! Talks to the QKart backend and keeps a visitor's view of the store
//! consistent:
//!
//! - [`catalog`]: product listing and search, with the default listing cached
//! - [`cart`]: the single write path for the cart, applying writes in order
//! - [`search`]: debounced search-box input
//!
//! Rendering is left to the embedding application; [`cart::CartView`] and
//! [`search::SearchView`] are the display models.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod search;
pub mod session;
pub mod state;

pub use state::Storefront;
