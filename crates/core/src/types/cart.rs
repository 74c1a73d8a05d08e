//! Cart state: lines, snapshots, and badge counts.
//!
//! A [`CartSnapshot`] never holds two lines for the same product. Lines
//! pushed for a product already in the cart are merged by summing quantities,
//! which is also how the backend treats a repeated add.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::id::{CartLineId, ProductId};
use super::price::{CurrencyCode, Price};
use super::product::ProductSummary;
use super::quantity::Quantity;
use super::wishlist::WishlistSet;

/// One product's presence in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Server-side cart row. `None` for lines restored from the local cache.
    pub line_id: Option<CartLineId>,
    pub product_id: ProductId,
    pub quantity: Quantity,
}

/// Where a snapshot's lines came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SnapshotOrigin {
    /// Fetched from the remote cart API (authoritative).
    Remote,
    /// Restored from the local cache (fast, possibly stale).
    #[default]
    LocalCache,
}

/// An ordered view of the cart plus the product data needed to price it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSnapshot {
    lines: Vec<CartLine>,
    products: HashMap<ProductId, ProductSummary>,
    origin: SnapshotOrigin,
}

impl CartSnapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new(origin: SnapshotOrigin) -> Self {
        Self {
            lines: Vec::new(),
            products: HashMap::new(),
            origin,
        }
    }

    /// Build a snapshot from lines, merging any duplicate products.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>, origin: SnapshotOrigin) -> Self {
        let mut snapshot = Self::new(origin);
        for line in lines {
            snapshot.push_line(line);
        }
        snapshot
    }

    /// Append a line, merging into an existing line for the same product.
    pub fn push_line(&mut self, line: CartLine) {
        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == line.product_id)
        {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
            if existing.line_id.is_none() {
                existing.line_id = line.line_id;
            }
        } else {
            self.lines.push(line);
        }
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub const fn origin(&self) -> SnapshotOrigin {
        self.origin
    }

    #[must_use]
    pub fn line(&self, line_id: CartLineId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.line_id == Some(line_id))
    }

    #[must_use]
    pub fn line_for_product(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Set a line's quantity, returning the previous value.
    ///
    /// Returns `None` (and changes nothing) if the line is absent.
    pub fn set_quantity(&mut self, line_id: CartLineId, quantity: Quantity) -> Option<Quantity> {
        self.lines
            .iter_mut()
            .find(|l| l.line_id == Some(line_id))
            .map(|line| std::mem::replace(&mut line.quantity, quantity))
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across all lines (what the cart badge shows).
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |sum, l| sum.saturating_add(l.quantity.get()))
    }

    /// Product data for a line, if it has been joined.
    #[must_use]
    pub fn product(&self, product_id: ProductId) -> Option<&ProductSummary> {
        self.products.get(&product_id)
    }

    /// Join catalog data into the snapshot. Later entries replace earlier ones.
    pub fn join_products(&mut self, products: impl IntoIterator<Item = ProductSummary>) {
        self.products
            .extend(products.into_iter().map(|p| (p.id, p)));
    }

    /// Products referenced by lines that have no joined catalog data yet.
    #[must_use]
    pub fn unpriced_products(&self) -> Vec<ProductId> {
        self.lines
            .iter()
            .map(|l| l.product_id)
            .filter(|id| !self.products.contains_key(id))
            .collect()
    }

    /// Sum of `price × quantity` over lines whose product data is known.
    ///
    /// Lines priced in a currency other than the first priced line's are
    /// skipped. The backend prices everything in INR, so in practice that
    /// never happens.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        let mut priced = self.lines.iter().filter_map(|line| {
            self.products
                .get(&line.product_id)
                .map(|p| p.price.line_total(line.quantity))
        });

        let Some(first) = priced.next() else {
            return Price::zero(CurrencyCode::default());
        };
        priced.fold(first, |sum, line_total| {
            sum.checked_add(&line_total).unwrap_or(sum)
        })
    }
}

/// Counts shown on the header badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct BadgeCounts {
    /// Sum of quantities, not number of lines.
    pub cart_count: u32,
    pub wishlist_count: usize,
}

impl BadgeCounts {
    #[must_use]
    pub fn from_state(cart: &CartSnapshot, wishlist: &WishlistSet) -> Self {
        Self {
            cart_count: cart.total_quantity(),
            wishlist_count: wishlist.len(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn line(line_id: i32, product_id: i32, quantity: u32) -> CartLine {
        CartLine {
            line_id: Some(CartLineId::new(line_id)),
            product_id: ProductId::new(product_id),
            quantity: Quantity::new(quantity).unwrap(),
        }
    }

    fn product(id: i32, price: i64) -> ProductSummary {
        ProductSummary {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            image: None,
            price: Price::inr(Decimal::new(price, 0)),
        }
    }

    #[test]
    fn test_duplicate_products_merge() {
        let snapshot = CartSnapshot::from_lines(
            [line(1, 10, 2), line(2, 10, 3), line(3, 11, 1)],
            SnapshotOrigin::Remote,
        );
        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.line_for_product(ProductId::new(10)).unwrap().quantity.get(),
            5
        );
        assert_eq!(snapshot.total_quantity(), 6);
    }

    #[test]
    fn test_cached_line_adopts_server_line_id() {
        let mut snapshot = CartSnapshot::new(SnapshotOrigin::LocalCache);
        snapshot.push_line(CartLine {
            line_id: None,
            product_id: ProductId::new(4),
            quantity: Quantity::ONE,
        });
        snapshot.push_line(line(8, 4, 1));
        assert!(snapshot.line(CartLineId::new(8)).is_some());
    }

    #[test]
    fn test_set_quantity_returns_previous() {
        let mut snapshot = CartSnapshot::from_lines([line(1, 10, 2)], SnapshotOrigin::Remote);
        let previous = snapshot.set_quantity(CartLineId::new(1), Quantity::new(7).unwrap());
        assert_eq!(previous.map(Quantity::get), Some(2));
        assert_eq!(snapshot.total_quantity(), 7);
        assert_eq!(
            snapshot.set_quantity(CartLineId::new(99), Quantity::ONE),
            None
        );
    }

    #[test]
    fn test_subtotal_joins_product_prices() {
        let mut snapshot = CartSnapshot::from_lines(
            [line(1, 10, 2), line(2, 11, 1)],
            SnapshotOrigin::Remote,
        );
        assert_eq!(snapshot.subtotal(), Price::zero(CurrencyCode::INR));
        assert_eq!(snapshot.unpriced_products().len(), 2);

        snapshot.join_products([product(10, 500), product(11, 1_299)]);
        assert_eq!(snapshot.subtotal().amount, Decimal::new(2_299, 0));
        assert_eq!(snapshot.subtotal().display(), "₹2,299");
        assert!(snapshot.unpriced_products().is_empty());
    }

    #[test]
    fn test_badge_counts_sum_quantities() {
        let snapshot = CartSnapshot::from_lines(
            [line(1, 10, 2), line(2, 11, 3)],
            SnapshotOrigin::Remote,
        );
        let wishlist: WishlistSet = [ProductId::new(1)].into_iter().collect();
        let counts = BadgeCounts::from_state(&snapshot, &wishlist);
        assert_eq!(counts.cart_count, 5);
        assert_eq!(counts.wishlist_count, 1);
    }
}
