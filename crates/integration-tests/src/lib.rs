//! End-to-end test support for the Zentro storefront client.
//!
//! [`FakeBackend`] serves the cart, order, and product endpoints from memory
//! on an ephemeral port. It behaves like the real backend where the client
//! can tell the difference:
//!
//! - cart endpoints redirect to `/login` without the session cookie
//! - adding a product already in the cart merges into its line
//! - `success: false` with a message for bad input
//! - products listing paginates, filters, and sorts
//!
//! Request counters and per-endpoint delays let tests observe and stall
//! traffic.
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = FakeBackend::spawn().await;
//! let api = ApiClient::new(&backend.logged_in_config())?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use zentro_storefront::StorefrontConfig;

/// Cookie value the fake backend accepts as a logged-in session.
pub const SESSION_TOKEN: &str = "test-session";

/// Products served by the listing, IDs `1..=CATALOG_SIZE`.
pub const CATALOG_SIZE: i32 = 12;

/// A product in the fake catalog.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub id: i32,
    pub name: String,
    pub category: i32,
    pub price: f64,
}

#[derive(Debug, Clone, Copy)]
struct CartRow {
    id: i32,
    product_id: i32,
    quantity: i64,
}

#[derive(Default)]
struct CartTable {
    rows: Vec<CartRow>,
    next_id: i32,
}

/// Per-endpoint request counters.
#[derive(Debug, Default)]
pub struct Counters {
    pub fetch: AtomicUsize,
    pub add: AtomicUsize,
    pub update: AtomicUsize,
    pub remove: AtomicUsize,
    pub order: AtomicUsize,
    pub products: AtomicUsize,
}

struct BackendState {
    catalog: Vec<CatalogEntry>,
    cart: Mutex<CartTable>,
    counters: Counters,
    fetch_delay_ms: AtomicU64,
    update_delay_ms: AtomicU64,
}

impl BackendState {
    fn cart(&self) -> MutexGuard<'_, CartTable> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn product(&self, id: i32) -> Option<&CatalogEntry> {
        self.catalog.iter().find(|p| p.id == id)
    }
}

/// In-memory storefront backend bound to `127.0.0.1` on a free port.
pub struct FakeBackend {
    addr: SocketAddr,
    state: Arc<BackendState>,
}

impl FakeBackend {
    /// Start serving. The server runs until the test's runtime shuts down.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    #[allow(clippy::expect_used)]
    pub async fn spawn() -> Self {
        let state = Arc::new(BackendState {
            catalog: default_catalog(),
            cart: Mutex::new(CartTable::default()),
            counters: Counters::default(),
            fetch_delay_ms: AtomicU64::new(0),
            update_delay_ms: AtomicU64::new(0),
        });

        let app = Router::new()
            .route("/api/cart", get(fetch_cart))
            .route("/api/cart/add", post(add_item))
            .route("/api/cart/update", post(update_quantity))
            .route("/api/cart/remove", post(remove_item))
            .route("/api/order/create", post(create_order))
            .route("/api/products", get(list_products))
            .route("/login", get(login_page))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Fake backend has no address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    /// Base URL of the running backend.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Client configuration pointing at this backend, without a session.
    ///
    /// # Panics
    ///
    /// Never in practice: the base URL is always valid.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig::for_base_url(&self.base_url()).expect("Fake backend URL is valid")
    }

    /// Client configuration with the accepted session cookie.
    #[must_use]
    pub fn logged_in_config(&self) -> StorefrontConfig {
        self.config().with_session_cookie(SESSION_TOKEN)
    }

    #[must_use]
    pub fn counters(&self) -> &Counters {
        &self.state.counters
    }

    /// Stall every `GET /api/cart` response.
    pub fn set_fetch_delay(&self, delay: Duration) {
        self.state
            .fetch_delay_ms
            .store(duration_millis(delay), Ordering::SeqCst);
    }

    /// Stall every `POST /api/cart/update` response.
    pub fn set_update_delay(&self, delay: Duration) {
        self.state
            .update_delay_ms
            .store(duration_millis(delay), Ordering::SeqCst);
    }

    /// Server-side cart as `(line_id, product_id, quantity)` rows.
    #[must_use]
    pub fn cart_rows(&self) -> Vec<(i32, i32, i64)> {
        self.state
            .cart()
            .rows
            .iter()
            .map(|r| (r.id, r.product_id, r.quantity))
            .collect()
    }
}

fn duration_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

fn default_catalog() -> Vec<CatalogEntry> {
    (1..=CATALOG_SIZE)
        .map(|id| CatalogEntry {
            id,
            name: format!("Cotton Kurta {id}"),
            category: id % 3 + 1,
            price: f64::from(id) * 499.0,
        })
        .collect()
}

// =============================================================================
// Handlers
// =============================================================================

fn is_logged_in(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .any(|pair| pair.trim() == format!("session={SESSION_TOKEN}"))
}

async fn pause(delay_ms: &AtomicU64) {
    let ms = delay_ms.load(Ordering::SeqCst);
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

fn rejected(message: &str) -> Response {
    Json(json!({"success": false, "message": message})).into_response()
}

fn ok() -> Response {
    Json(json!({"success": true})).into_response()
}

async fn login_page() -> &'static str {
    "<html>Login</html>"
}

async fn fetch_cart(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.counters.fetch.fetch_add(1, Ordering::SeqCst);
    if !is_logged_in(&headers) {
        return Redirect::to("/login").into_response();
    }
    pause(&state.fetch_delay_ms).await;

    let rows: Vec<Value> = state
        .cart()
        .rows
        .iter()
        .filter_map(|row| {
            let product = state.product(row.product_id)?;
            Some(json!({
                "id": row.id,
                "product_id": row.product_id,
                "name": product.name,
                "image": format!("/static/uploads/{}.jpg", product.id),
                "price": product.price,
                "quantity": row.quantity,
            }))
        })
        .collect();

    Json(json!({"success": true, "cart": rows})).into_response()
}

#[derive(Deserialize)]
struct AddBody {
    product_id: Option<i32>,
    qty: Option<i64>,
}

async fn add_item(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<AddBody>,
) -> Response {
    state.counters.add.fetch_add(1, Ordering::SeqCst);
    if !is_logged_in(&headers) {
        return Redirect::to("/login").into_response();
    }

    let Some(product_id) = body.product_id else {
        return rejected("Invalid product");
    };
    let qty = body.qty.unwrap_or(1);
    if qty < 1 {
        return rejected("Invalid quantity");
    }
    if state.product(product_id).is_none() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "message": "Product not found"})),
        )
            .into_response();
    }

    let mut cart = state.cart();
    if let Some(row) = cart.rows.iter_mut().find(|r| r.product_id == product_id) {
        row.quantity += qty;
    } else {
        cart.next_id += 1;
        let id = cart.next_id;
        cart.rows.push(CartRow {
            id,
            product_id,
            quantity: qty,
        });
    }
    drop(cart);

    Json(json!({"success": true, "message": "Added to cart"})).into_response()
}

#[derive(Deserialize)]
struct UpdateBody {
    cart_id: i32,
    qty: i64,
}

async fn update_quantity(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<UpdateBody>,
) -> Response {
    state.counters.update.fetch_add(1, Ordering::SeqCst);
    if !is_logged_in(&headers) {
        return Redirect::to("/login").into_response();
    }
    pause(&state.update_delay_ms).await;

    if body.qty < 1 {
        return rejected("Invalid quantity");
    }
    let mut cart = state.cart();
    let Some(row) = cart.rows.iter_mut().find(|r| r.id == body.cart_id) else {
        return rejected("Cart item not found");
    };
    row.quantity = body.qty;
    drop(cart);
    ok()
}

#[derive(Deserialize)]
struct RemoveBody {
    cart_id: i32,
}

async fn remove_item(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<RemoveBody>,
) -> Response {
    state.counters.remove.fetch_add(1, Ordering::SeqCst);
    if !is_logged_in(&headers) {
        return Redirect::to("/login").into_response();
    }
    state.cart().rows.retain(|r| r.id != body.cart_id);
    ok()
}

async fn create_order(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.counters.order.fetch_add(1, Ordering::SeqCst);
    if !is_logged_in(&headers) {
        return Redirect::to("/login").into_response();
    }

    let mut cart = state.cart();
    if cart.rows.is_empty() {
        return rejected("Cart is empty");
    }
    cart.rows.clear();
    drop(cart);

    Json(json!({"success": true, "message": "Order placed successfully"})).into_response()
}

#[derive(Deserialize)]
struct ProductParams {
    page: Option<u32>,
    limit: Option<u32>,
    category: Option<i32>,
    search: Option<String>,
    sort: Option<String>,
}

async fn list_products(
    State(state): State<Arc<BackendState>>,
    Query(params): Query<ProductParams>,
) -> Json<Value> {
    state.counters.products.fetch_add(1, Ordering::SeqCst);

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(8).clamp(1, 50);
    let search = params.search.map(|s| s.to_lowercase());

    let mut matches: Vec<&CatalogEntry> = state
        .catalog
        .iter()
        .filter(|p| params.category.is_none_or(|c| p.category == c))
        .filter(|p| {
            search
                .as_deref()
                .is_none_or(|s| p.name.to_lowercase().contains(s))
        })
        .collect();
    match params.sort.as_deref() {
        Some("price_asc") => matches.sort_by(|a, b| a.price.total_cmp(&b.price)),
        Some("price_desc") => matches.sort_by(|a, b| b.price.total_cmp(&a.price)),
        _ => matches.sort_by(|a, b| b.id.cmp(&a.id)),
    }

    let total_items = matches.len();
    let per_page = limit as usize;
    let total_pages = total_items.div_ceil(per_page);
    let products: Vec<Value> = matches
        .iter()
        .skip((page as usize - 1) * per_page)
        .take(per_page)
        .map(|p| {
            json!({
                "id": p.id,
                "name": p.name,
                "sku": format!("ZEN-{:04}", p.id),
                "price": p.price,
                "images": [format!("/static/uploads/{}.jpg", p.id)],
                "status": "active",
            })
        })
        .collect();

    Json(json!({
        "success": true,
        "products": products,
        "pagination": {
            "page": page,
            "limit": limit,
            "total_items": total_items,
            "total_pages": total_pages,
            "has_next": (page as usize) < total_pages,
            "has_prev": page > 1,
        }
    }))
}
