//! Core types for QKart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;
pub mod rating;

pub use cart::{CartItem, CartRecord};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::{Catalog, Product};
pub use rating::{Rating, RatingError};
