//! Command implementations.
//!
//! Every command runs against a [`Session`]: one API client, the file-backed
//! local cache, and a synchronizer restored from that cache.

pub mod cart;
pub mod catalog;
pub mod prefs;
pub mod wishlist;

use std::sync::Arc;

use thiserror::Error;
use zentro_storefront::config::ConfigError;
use zentro_storefront::local::StoreError;
use zentro_storefront::{
    ApiClient, CartSynchronizer, CatalogClient, FileStore, LocalCache, RemoteError,
    StorefrontConfig, SyncError, TracingNotifier,
};

/// Errors that can end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Environment configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The local cache file could not be opened.
    #[error("Local cache error: {0}")]
    Store(#[from] StoreError),

    /// A catalog or client-setup request failed.
    #[error("{0}")]
    Remote(#[from] RemoteError),

    /// A cart operation failed.
    #[error("{0}")]
    Sync(#[from] SyncError),
}

/// Everything a command needs.
pub struct Session {
    pub api: ApiClient,
    pub cache: LocalCache,
    pub sync: CartSynchronizer,
}

impl Session {
    /// Open the local cache and connect the synchronizer to the backend.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if the cache file is unreadable or the HTTP client
    /// cannot be built.
    pub fn open(config: &StorefrontConfig) -> Result<Self, CliError> {
        let api = ApiClient::new(config)?;
        let store = FileStore::open(&config.cache_path)?;
        tracing::debug!(path = %store.path().display(), "Opened local cache");
        let cache = LocalCache::new(Arc::new(store));
        let sync = CartSynchronizer::new(
            Arc::new(api.clone()),
            cache.clone(),
            Arc::new(TracingNotifier),
        );

        if cache.take_new_user_prompt() {
            tracing::info!("Welcome to Zentro! Run `zentro products` to start browsing.");
        }

        Ok(Self { api, cache, sync })
    }

    /// A catalog client sharing this session's connection pool.
    pub fn catalog(&self) -> CatalogClient {
        CatalogClient::new(self.api.clone())
    }

    /// Persist in-memory state before exit.
    pub fn close(&self) {
        self.sync.flush();
    }
}
