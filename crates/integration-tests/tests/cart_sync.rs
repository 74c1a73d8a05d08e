//! End-to-end cart synchronization against the fake backend.
//!
//! Each test starts its own backend on an ephemeral port, so tests run in
//! parallel without sharing state.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use zentro_core::{CartLineId, ProductId, Quantity, SnapshotOrigin};
use zentro_integration_tests::FakeBackend;
use zentro_storefront::api::CartApi;
use zentro_storefront::{
    ApiClient, CartSynchronizer, FileStore, LocalCache, MemoryStore, NoopNotifier,
    QuantityUpdate, RemoteError, StorefrontConfig, SyncError,
};

fn synchronizer(config: &StorefrontConfig, cache: LocalCache) -> CartSynchronizer {
    let api = ApiClient::new(config).unwrap();
    CartSynchronizer::new(Arc::new(api), cache, Arc::new(NoopNotifier))
}

fn memory_cache() -> LocalCache {
    LocalCache::new(Arc::new(MemoryStore::new()))
}

fn line_for(sync: &CartSynchronizer, product_id: i32) -> CartLineId {
    sync.snapshot()
        .line_for_product(ProductId::new(product_id))
        .and_then(|line| line.line_id)
        .unwrap()
}

#[tokio::test]
async fn test_add_then_load_shows_single_priced_line() {
    let backend = FakeBackend::spawn().await;
    let sync = synchronizer(&backend.logged_in_config(), memory_cache());
    assert!(sync.snapshot().is_empty());

    sync.add_to_cart(ProductId::new(1), 2).await.unwrap();
    let snapshot = sync.load_cart().await;

    assert_eq!(snapshot.origin(), SnapshotOrigin::Remote);
    assert_eq!(snapshot.len(), 1);
    let line = snapshot.line_for_product(ProductId::new(1)).unwrap();
    assert_eq!(line.quantity.get(), 2);
    assert!(line.line_id.is_some());
    assert_eq!(sync.badge_counts().cart_count, 2);

    let product = snapshot.product(ProductId::new(1)).unwrap();
    assert_eq!(product.name, "Cotton Kurta 1");
    assert_eq!(snapshot.subtotal().to_string(), "₹998");
}

#[tokio::test]
async fn test_repeated_add_merges_on_server() {
    let backend = FakeBackend::spawn().await;
    let sync = synchronizer(&backend.logged_in_config(), memory_cache());

    sync.add_to_cart(ProductId::new(3), 1).await.unwrap();
    sync.add_to_cart(ProductId::new(3), 2).await.unwrap();

    assert_eq!(backend.cart_rows().len(), 1);
    assert_eq!(sync.snapshot().len(), 1);
    assert_eq!(sync.badge_counts().cart_count, 3);
}

#[tokio::test]
async fn test_missing_session_is_unauthenticated() {
    let backend = FakeBackend::spawn().await;
    let sync = synchronizer(&backend.config(), memory_cache());

    let err = sync.add_to_cart(ProductId::new(1), 1).await.unwrap_err();
    assert_eq!(err, SyncError::Unauthenticated);
    assert!(backend.cart_rows().is_empty());

    let snapshot = sync.load_cart().await;
    assert_eq!(snapshot.origin(), SnapshotOrigin::LocalCache);
    assert_eq!(sync.last_load_error(), Some(SyncError::Unauthenticated));
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let backend = FakeBackend::spawn().await;
    backend.set_fetch_delay(Duration::from_secs(2));
    let config = backend
        .logged_in_config()
        .with_request_timeout(Duration::from_millis(200));

    let api = ApiClient::new(&config).unwrap();
    assert!(matches!(api.fetch_cart().await, Err(RemoteError::Timeout)));

    let sync = synchronizer(&config, memory_cache());
    let snapshot = sync.load_cart().await;
    assert_eq!(snapshot.origin(), SnapshotOrigin::LocalCache);
    assert_eq!(
        sync.last_load_error(),
        Some(SyncError::RequestFailed("Request timed out".to_string()))
    );
}

#[tokio::test]
async fn test_update_while_pending_sends_one_request() {
    let backend = FakeBackend::spawn().await;
    let sync = synchronizer(&backend.logged_in_config(), memory_cache());
    sync.add_to_cart(ProductId::new(1), 1).await.unwrap();
    sync.add_to_cart(ProductId::new(2), 1).await.unwrap();
    let first = line_for(&sync, 1);
    let second = line_for(&sync, 2);

    backend.set_update_delay(Duration::from_millis(300));
    let pending = {
        let sync = sync.clone();
        tokio::spawn(async move { sync.update_quantity(first, 4).await })
    };
    while backend.counters().update.load(Ordering::SeqCst) == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert!(sync.is_quantity_update_pending());
    let outcome = sync.update_quantity(second, 6).await.unwrap();
    assert_eq!(outcome, QuantityUpdate::Dropped);

    assert_eq!(pending.await.unwrap().unwrap(), QuantityUpdate::Applied);
    assert_eq!(backend.counters().update.load(Ordering::SeqCst), 1);
    assert!(!sync.is_quantity_update_pending());
    assert_eq!(sync.badge_counts().cart_count, 5);
}

#[tokio::test]
async fn test_update_to_zero_sends_nothing() {
    let backend = FakeBackend::spawn().await;
    let sync = synchronizer(&backend.logged_in_config(), memory_cache());
    sync.add_to_cart(ProductId::new(5), 2).await.unwrap();

    let err = sync.update_quantity(line_for(&sync, 5), 0).await.unwrap_err();

    assert_eq!(err, SyncError::InvalidQuantity(0));
    assert_eq!(backend.counters().update.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let backend = FakeBackend::spawn().await;
    let sync = synchronizer(&backend.logged_in_config(), memory_cache());
    sync.add_to_cart(ProductId::new(1), 2).await.unwrap();
    sync.add_to_cart(ProductId::new(2), 1).await.unwrap();
    let line = line_for(&sync, 1);

    sync.remove_from_cart(line).await.unwrap();
    sync.remove_from_cart(line).await.unwrap();
    sync.remove_from_cart(CartLineId::new(404)).await.unwrap();

    assert_eq!(backend.counters().remove.load(Ordering::SeqCst), 1);
    assert_eq!(sync.badge_counts().cart_count, 1);
}

#[tokio::test]
async fn test_place_order_clears_cart() {
    let backend = FakeBackend::spawn().await;
    let sync = synchronizer(&backend.logged_in_config(), memory_cache());
    sync.add_to_cart(ProductId::new(4), 1).await.unwrap();

    sync.place_order().await.unwrap();
    assert!(sync.snapshot().is_empty());
    assert!(backend.cart_rows().is_empty());

    let err = sync.place_order().await.unwrap_err();
    assert_eq!(err, SyncError::RequestFailed("Cart is empty".to_string()));
}

#[tokio::test]
async fn test_unknown_product_reports_server_message() {
    let backend = FakeBackend::spawn().await;
    let sync = synchronizer(&backend.logged_in_config(), memory_cache());

    let err = sync.add_to_cart(ProductId::new(999), 1).await.unwrap_err();

    assert_eq!(err, SyncError::RequestFailed("Product not found".to_string()));
}

#[tokio::test]
async fn test_file_cache_paints_next_session() {
    let backend = FakeBackend::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");

    {
        let cache = LocalCache::new(Arc::new(FileStore::open(&path).unwrap()));
        let sync = synchronizer(&backend.logged_in_config(), cache);
        sync.add_to_cart(ProductId::new(7), 3).await.unwrap();
        sync.toggle_wishlist(ProductId::new(8));
        sync.flush();
    }

    // Logged out: the remote cart is unreachable, the cache still paints
    let cache = LocalCache::new(Arc::new(FileStore::open(&path).unwrap()));
    let sync = synchronizer(&backend.config(), cache);
    let counts = sync.badge_counts();
    assert_eq!(counts.cart_count, 3);
    assert_eq!(counts.wishlist_count, 1);

    let snapshot = sync.load_cart().await;
    assert_eq!(snapshot.origin(), SnapshotOrigin::LocalCache);
    assert_eq!(snapshot.total_quantity(), 3);
    assert!(sync.is_wishlisted(ProductId::new(8)));
}

#[tokio::test]
async fn test_remove_before_first_load_reaches_backend() {
    let backend = FakeBackend::spawn().await;
    let config = backend.logged_in_config();
    let api = ApiClient::new(&config).unwrap();
    api.add_item(ProductId::new(6), Quantity::ONE)
        .await
        .unwrap();
    let line = api.fetch_cart().await.unwrap().lines()[0].line_id.unwrap();

    // A fresh session paints from the cache and has not loaded yet
    let sync = synchronizer(&config, memory_cache());
    assert_eq!(sync.snapshot().origin(), SnapshotOrigin::LocalCache);
    sync.remove_from_cart(line).await.unwrap();

    assert_eq!(backend.counters().remove.load(Ordering::SeqCst), 1);
    assert!(backend.cart_rows().is_empty());
    assert_eq!(sync.snapshot().origin(), SnapshotOrigin::Remote);
}
