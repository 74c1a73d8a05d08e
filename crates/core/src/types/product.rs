//! Product data joined into carts at render time.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// The slice of catalog data a cart needs to render a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub image: Option<String>,
    pub price: Price,
}
