//! Zentro storefront client.
//!
//! Keeps the client's cart and wishlist in step with the Zentro backend:
//!
//! - [`sync`] - the [`CartSynchronizer`] that owns cart/wishlist state
//! - [`api`] - HTTP client for the cart, order, and product endpoints
//! - [`local`] - persistent key-value cache (memory or file backed)
//! - [`notify`] - toast and quantity-control feedback
//! - [`config`] - environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod local;
pub mod notify;
pub mod sync;

pub use api::{ApiClient, CartApi, CatalogClient, RemoteError};
pub use config::StorefrontConfig;
pub use error::{Result, SyncError};
pub use local::{FileStore, LocalCache, MemoryStore};
pub use notify::{NoopNotifier, Notifier, ToastLevel, TracingNotifier};
pub use sync::{CartSynchronizer, QuantityUpdate};
