//! Remote cart operations.
//!
//! [`CartApi`] is the seam between the synchronizer and the backend. The
//! HTTP implementation lives on [`ApiClient`]; tests substitute in-memory
//! fakes.

use async_trait::async_trait;
use tracing::{debug, instrument};

use zentro_core::{CartLineId, CartSnapshot, ProductId, Quantity};

use super::conversions::convert_cart;
use super::types::{AddItemRequest, CartResponse, RemoveItemRequest, UpdateQuantityRequest};
use super::{ApiClient, RemoteError};

const CART_PATH: &str = "api/cart";
const CART_ADD_PATH: &str = "api/cart/add";
const CART_UPDATE_PATH: &str = "api/cart/update";
const CART_REMOVE_PATH: &str = "api/cart/remove";
const ORDER_CREATE_PATH: &str = "api/order/create";

/// The authoritative remote cart.
#[async_trait]
pub trait CartApi: Send + Sync {
    /// Fetch the current cart.
    async fn fetch_cart(&self) -> Result<CartSnapshot, RemoteError>;

    /// Add `quantity` of a product. The backend merges into an existing line.
    async fn add_item(&self, product_id: ProductId, quantity: Quantity)
    -> Result<(), RemoteError>;

    /// Set a line's quantity.
    async fn update_quantity(
        &self,
        line_id: CartLineId,
        quantity: Quantity,
    ) -> Result<(), RemoteError>;

    /// Remove a line.
    async fn remove_item(&self, line_id: CartLineId) -> Result<(), RemoteError>;

    /// Turn the cart into an order.
    async fn create_order(&self) -> Result<(), RemoteError>;
}

#[async_trait]
impl CartApi for ApiClient {
    #[instrument(skip(self))]
    async fn fetch_cart(&self) -> Result<CartSnapshot, RemoteError> {
        let response: CartResponse = self.get(self.endpoint(CART_PATH)?).await?;
        if !response.success {
            return Err(RemoteError::Rejected(response.message.unwrap_or_default()));
        }

        debug!(rows = response.cart.len(), "Fetched cart");
        Ok(convert_cart(response.cart))
    }

    #[instrument(skip(self), fields(product_id = %product_id, quantity = %quantity))]
    async fn add_item(
        &self,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<(), RemoteError> {
        let body = AddItemRequest {
            product_id,
            qty: quantity,
        };
        self.post_command(CART_ADD_PATH, Some(&body)).await
    }

    #[instrument(skip(self), fields(line_id = %line_id, quantity = %quantity))]
    async fn update_quantity(
        &self,
        line_id: CartLineId,
        quantity: Quantity,
    ) -> Result<(), RemoteError> {
        let body = UpdateQuantityRequest {
            cart_id: line_id,
            qty: quantity,
        };
        self.post_command(CART_UPDATE_PATH, Some(&body)).await
    }

    #[instrument(skip(self), fields(line_id = %line_id))]
    async fn remove_item(&self, line_id: CartLineId) -> Result<(), RemoteError> {
        let body = RemoveItemRequest { cart_id: line_id };
        self.post_command(CART_REMOVE_PATH, Some(&body)).await
    }

    #[instrument(skip(self))]
    async fn create_order(&self) -> Result<(), RemoteError> {
        self.post_command::<()>(ORDER_CREATE_PATH, None).await
    }
}
