//! Conversions from backend wire types to core types.

use tracing::warn;

use zentro_core::{CartLine, CartSnapshot, Price, ProductSummary, Quantity, SnapshotOrigin};

use super::types::{CartItem, ProductItem};

/// Build an authoritative snapshot from server cart rows.
///
/// Rows with a quantity below one break the cart invariant and are dropped.
pub(super) fn convert_cart(items: Vec<CartItem>) -> CartSnapshot {
    let mut snapshot = CartSnapshot::new(SnapshotOrigin::Remote);
    let mut products = Vec::with_capacity(items.len());

    for item in items {
        let Ok(quantity) = Quantity::try_from(item.quantity) else {
            warn!(
                line_id = %item.id,
                quantity = item.quantity,
                "Dropping cart row with non-positive quantity"
            );
            continue;
        };

        snapshot.push_line(CartLine {
            line_id: Some(item.id),
            product_id: item.product_id,
            quantity,
        });
        products.push(ProductSummary {
            id: item.product_id,
            name: item.name,
            image: item.image.filter(|i| !i.is_empty()),
            price: Price::inr(item.price),
        });
    }

    snapshot.join_products(products);
    snapshot
}

/// Convert a listing entry, using its first image as the thumbnail.
pub(super) fn convert_product(item: ProductItem) -> ProductSummary {
    ProductSummary {
        id: item.id,
        name: item.name,
        image: item.images.into_iter().find(|i| !i.is_empty()),
        price: Price::inr(item.price),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use zentro_core::{CartLineId, ProductId};

    use super::*;

    fn item(id: i32, product_id: i32, quantity: i64) -> CartItem {
        CartItem {
            id: CartLineId::new(id),
            product_id: ProductId::new(product_id),
            name: format!("Product {product_id}"),
            image: Some(String::new()),
            price: Decimal::new(250, 0),
            quantity,
        }
    }

    #[test]
    fn test_convert_cart_joins_prices() {
        let snapshot = convert_cart(vec![item(1, 10, 2), item(2, 11, 1)]);
        assert_eq!(snapshot.origin(), SnapshotOrigin::Remote);
        assert_eq!(snapshot.total_quantity(), 3);
        assert_eq!(snapshot.subtotal().amount, Decimal::new(750, 0));
        let product = snapshot.product(ProductId::new(10));
        assert!(product.is_some_and(|p| p.image.is_none()));
    }

    #[test]
    fn test_convert_cart_drops_zero_quantity_rows() {
        let snapshot = convert_cart(vec![item(1, 10, 0), item(2, 11, -3), item(3, 12, 1)]);
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.line(CartLineId::new(3)).is_some());
    }

    #[test]
    fn test_convert_product_uses_first_image() {
        let product = convert_product(ProductItem {
            id: ProductId::new(5),
            name: "Saree".to_string(),
            sku: Some("SR-1".to_string()),
            price: Decimal::new(1_999, 0),
            images: vec![String::new(), "/img/a.png".to_string(), "/img/b.png".to_string()],
            status: Some("ACTIVE".to_string()),
        });
        assert_eq!(product.image.as_deref(), Some("/img/a.png"));
        assert_eq!(product.price.display(), "₹1,999");
    }
}
