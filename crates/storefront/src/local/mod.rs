//! Local persistence: a string key-value store plus a typed cache over it.
//!
//! The local cache is a continuity aid, never a source of truth. Reads decode
//! defensively (missing or malformed data becomes an empty collection) and
//! writes are fire-and-forget.
//!
//! # Stores
//!
//! - [`MemoryStore`] - process-local, for tests and anonymous sessions
//! - [`FileStore`] - a JSON object on disk, the CLI's stand-in for browser storage

mod cache;
mod file;
mod memory;

pub use cache::{DEFAULT_CITY, LocalCache};
pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use thiserror::Error;

/// Errors from a key-value store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store contents could not be encoded.
    #[error("Storage encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A string key-value store with `localStorage` semantics.
///
/// Operations are synchronous so wishlist toggles never suspend.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Shared handle to a store.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Fixed keys used in the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Cart,
    Wishlist,
    City,
    CookieConsent,
    NewUserShown,
    MiniCartOpen,
}

impl StorageKey {
    /// The key string, shared with the web frontend's storage layout.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cart => "zentro_cart",
            Self::Wishlist => "zentro_wishlist",
            Self::City => "zentro_city",
            Self::CookieConsent => "zentro_cookie_accepted",
            Self::NewUserShown => "zentro_newuser_shown",
            Self::MiniCartOpen => "zentro_mini_open",
        }
    }
}
