//! Core types for Zentro.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;
pub mod quantity;
pub mod wishlist;

pub use cart::{BadgeCounts, CartLine, CartSnapshot, SnapshotOrigin};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use product::ProductSummary;
pub use quantity::{Quantity, QuantityError};
pub use wishlist::{WishlistSet, WishlistState};
