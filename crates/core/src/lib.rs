//! Zentro Core - Shared types library.
//!
//! This crate provides the types shared by every Zentro client component:
//! - `storefront` - Cart/wishlist synchronizer, remote API clients, local cache
//! - `cli` - Command-line shell over the synchronizer
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! Every invariant that can live in a type lives here: quantities are never
//! below one, a cart holds at most one line per product, and a wishlist never
//! holds duplicates.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, quantities, prices, carts, and wishlists

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
