//! Product listing and cart pricing against the fake backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::atomic::Ordering;

use zentro_core::{CartLine, CartSnapshot, ProductId, Quantity, SnapshotOrigin};
use zentro_integration_tests::{CATALOG_SIZE, FakeBackend};
use zentro_storefront::api::{ProductQuery, ProductSort};
use zentro_storefront::{ApiClient, CatalogClient};

fn catalog(backend: &FakeBackend) -> CatalogClient {
    CatalogClient::new(ApiClient::new(&backend.config()).unwrap())
}

#[tokio::test]
async fn test_default_listing_is_first_page_newest_first() {
    let backend = FakeBackend::spawn().await;
    let page = catalog(&backend)
        .list_products(&ProductQuery::default())
        .await
        .unwrap();

    assert_eq!(page.products.len(), 8);
    assert_eq!(page.products[0].id, ProductId::new(CATALOG_SIZE));
    assert_eq!(page.pagination.total_items, 12);
    assert_eq!(page.pagination.total_pages, 2);
    assert!(page.pagination.has_next);
    assert!(!page.pagination.has_prev);
    assert_eq!(
        page.products[0].image.as_deref(),
        Some("/static/uploads/12.jpg")
    );
}

#[tokio::test]
async fn test_listing_is_cached_per_query() {
    let backend = FakeBackend::spawn().await;
    let client = catalog(&backend);
    let query = ProductQuery::default();

    client.list_products(&query).await.unwrap();
    client.list_products(&query).await.unwrap();
    assert_eq!(backend.counters().products.load(Ordering::SeqCst), 1);

    client.list_products(&query.with_page(2)).await.unwrap();
    assert_eq!(backend.counters().products.load(Ordering::SeqCst), 2);

    client.invalidate();
    client.list_products(&query).await.unwrap();
    assert_eq!(backend.counters().products.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_search_and_sort() {
    let backend = FakeBackend::spawn().await;
    let query = ProductQuery {
        search: Some("Kurta 1".to_string()),
        sort: ProductSort::PriceAsc,
        ..ProductQuery::default()
    };
    let page = catalog(&backend).list_products(&query).await.unwrap();

    let ids: Vec<i32> = page.products.iter().map(|p| p.id.as_i32()).collect();
    assert_eq!(ids, vec![1, 10, 11, 12]);
    assert_eq!(page.products[0].price.to_string(), "₹499");
}

#[tokio::test]
async fn test_join_prices_cached_cart() {
    let backend = FakeBackend::spawn().await;
    let mut snapshot = CartSnapshot::from_lines(
        [2, 11].map(|id| CartLine {
            line_id: None,
            product_id: ProductId::new(id),
            quantity: Quantity::new(2).unwrap(),
        }),
        SnapshotOrigin::LocalCache,
    );
    assert_eq!(snapshot.unpriced_products().len(), 2);

    catalog(&backend).join_into(&mut snapshot).await.unwrap();

    assert!(snapshot.unpriced_products().is_empty());
    assert_eq!(snapshot.subtotal().to_string(), "₹12,974");
}
