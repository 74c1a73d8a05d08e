//! Wishlist membership.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Membership after a toggle, so a caller can flip its control's visual state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WishlistState {
    Added,
    Removed,
}

impl WishlistState {
    /// Whether the product is on the wishlist after the toggle.
    #[must_use]
    pub const fn is_wishlisted(self) -> bool {
        matches!(self, Self::Added)
    }
}

/// A set of wishlisted products.
///
/// Serializes as a plain JSON array of product IDs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WishlistSet(BTreeSet<ProductId>);

impl WishlistSet {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.0.contains(&id)
    }

    /// Add the product if absent, remove it if present.
    pub fn toggle(&mut self, id: ProductId) -> WishlistState {
        if self.0.remove(&id) {
            WishlistState::Removed
        } else {
            self.0.insert(id);
            WishlistState::Added
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<ProductId> for WishlistSet {
    fn from_iter<I: IntoIterator<Item = ProductId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores_membership() {
        let mut wishlist = WishlistSet::new();
        let id = ProductId::new(5);

        assert_eq!(wishlist.toggle(id), WishlistState::Added);
        assert!(wishlist.contains(id));
        assert_eq!(wishlist.toggle(id), WishlistState::Removed);
        assert!(!wishlist.contains(id));
        assert!(wishlist.is_empty());
    }

    #[test]
    fn test_duplicates_collapse() {
        let wishlist: WishlistSet = [1, 2, 2, 1].into_iter().map(ProductId::new).collect();
        assert_eq!(wishlist.len(), 2);
    }

    #[test]
    fn test_serializes_as_id_array() {
        let wishlist: WishlistSet = [3, 1].into_iter().map(ProductId::new).collect();
        assert_eq!(serde_json::to_string(&wishlist).unwrap(), "[1,3]");
        let back: WishlistSet = serde_json::from_str("[7,7,8]").unwrap();
        assert_eq!(back.len(), 2);
    }
}
