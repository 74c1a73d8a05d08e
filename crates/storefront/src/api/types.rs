//! Wire types for the storefront backend's JSON API.
//!
//! Field names match the backend exactly (`qty` in requests, `quantity` in
//! responses). Prices arrive as JSON numbers in rupees.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use zentro_core::{CartLineId, ProductId, Quantity};

use super::RemoteError;

/// The `{success, message}` shape every endpoint answers with.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl Envelope {
    /// Convert `success: false` into `RemoteError::Rejected`.
    pub fn into_result(self) -> Result<(), RemoteError> {
        if self.success {
            Ok(())
        } else {
            Err(RemoteError::Rejected(self.message.unwrap_or_default()))
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// `GET /api/cart` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CartResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub cart: Vec<CartItem>,
}

/// One row of the server cart.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItem {
    pub id: CartLineId,
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub price: Decimal,
    pub quantity: i64,
}

/// `POST /api/cart/add` body.
#[derive(Debug, Clone, Serialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub qty: Quantity,
}

/// `POST /api/cart/update` body.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateQuantityRequest {
    pub cart_id: CartLineId,
    pub qty: Quantity,
}

/// `POST /api/cart/remove` body.
#[derive(Debug, Clone, Serialize)]
pub struct RemoveItemRequest {
    pub cart_id: CartLineId,
}

// =============================================================================
// Catalog
// =============================================================================

/// `GET /api/products` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub products: Vec<ProductItem>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// One product in a listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductItem {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Listing pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}
