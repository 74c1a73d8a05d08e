//! Typed view of the local store.
//!
//! This is the only place that parses cached JSON. Every read has a default:
//! a missing key, a non-JSON string, or a JSON value of the wrong shape all
//! decode to an empty cart, an empty wishlist, or the default preference.
//! An empty cart or wishlist is stored as an absent key. Write failures are
//! logged and swallowed.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use zentro_core::{CartLine, CartSnapshot, ProductId, Quantity, SnapshotOrigin, WishlistSet};

use super::{SharedStore, StorageKey};

/// City shown in the delivery banner until the user picks one.
pub const DEFAULT_CITY: &str = "Delhi";

/// Flag value written for boolean preferences.
const FLAG_SET: &str = "1";

/// Product IDs have been written both as numbers and as numeric strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CachedId {
    Number(i32),
    Text(String),
}

impl CachedId {
    fn parse(&self) -> Option<ProductId> {
        match self {
            Self::Number(n) => Some(ProductId::new(*n)),
            Self::Text(s) => s.parse().ok(),
        }
    }
}

/// Cart entry as stored: `{id, qty}` where `id` is the product ID.
#[derive(Debug, Deserialize)]
struct CachedCartEntry {
    id: CachedId,
    #[serde(default)]
    qty: Quantity,
}

#[derive(Serialize)]
struct CartEntryRef {
    id: ProductId,
    qty: Quantity,
}

/// Typed, defensively-decoding access to the local store.
#[derive(Clone)]
pub struct LocalCache {
    store: SharedStore,
}

impl LocalCache {
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    // =========================================================================
    // Cart & wishlist
    // =========================================================================

    /// Read the cached cart. Lines have no server line ID and no prices.
    #[must_use]
    pub fn read_cart(&self) -> CartSnapshot {
        let entries: Vec<CachedCartEntry> = self.read_json(StorageKey::Cart).unwrap_or_default();
        let lines = entries.into_iter().filter_map(|entry| {
            entry.id.parse().map(|product_id| CartLine {
                line_id: None,
                product_id,
                quantity: entry.qty,
            })
        });
        CartSnapshot::from_lines(lines, SnapshotOrigin::LocalCache)
    }

    /// Cache the cart as `[{id, qty}]`.
    pub fn write_cart(&self, cart: &CartSnapshot) {
        if cart.is_empty() {
            self.remove(StorageKey::Cart);
            return;
        }
        let entries: Vec<CartEntryRef> = cart
            .lines()
            .iter()
            .map(|line| CartEntryRef {
                id: line.product_id,
                qty: line.quantity,
            })
            .collect();
        self.write_json(StorageKey::Cart, &entries);
    }

    /// Read the cached wishlist.
    #[must_use]
    pub fn read_wishlist(&self) -> WishlistSet {
        let ids: Vec<CachedId> = self.read_json(StorageKey::Wishlist).unwrap_or_default();
        ids.iter().filter_map(CachedId::parse).collect()
    }

    /// Cache the wishlist as an array of product IDs.
    pub fn write_wishlist(&self, wishlist: &WishlistSet) {
        if wishlist.is_empty() {
            self.remove(StorageKey::Wishlist);
            return;
        }
        self.write_json(StorageKey::Wishlist, wishlist);
    }

    /// Forget the cached cart and wishlist.
    pub fn clear_cart_and_wishlist(&self) {
        self.remove(StorageKey::Cart);
        self.remove(StorageKey::Wishlist);
    }

    // =========================================================================
    // Preferences
    // =========================================================================

    /// The delivery city, or [`DEFAULT_CITY`].
    #[must_use]
    pub fn city(&self) -> String {
        self.read_raw(StorageKey::City)
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CITY.to_string())
    }

    pub fn set_city(&self, city: &str) {
        self.write_raw(StorageKey::City, city.trim());
    }

    /// Whether the cookie banner has been accepted.
    #[must_use]
    pub fn cookies_accepted(&self) -> bool {
        self.read_raw(StorageKey::CookieConsent).is_some()
    }

    pub fn accept_cookies(&self) {
        self.write_raw(StorageKey::CookieConsent, FLAG_SET);
    }

    /// Returns `true` the first time it is called for this store, then marks
    /// the new-user prompt as shown.
    pub fn take_new_user_prompt(&self) -> bool {
        if self.read_raw(StorageKey::NewUserShown).is_some() {
            return false;
        }
        self.write_raw(StorageKey::NewUserShown, FLAG_SET);
        true
    }

    /// Whether the mini-cart panel was left open.
    #[must_use]
    pub fn mini_cart_open(&self) -> bool {
        self.read_raw(StorageKey::MiniCartOpen).is_some()
    }

    pub fn set_mini_cart_open(&self, open: bool) {
        if open {
            self.write_raw(StorageKey::MiniCartOpen, FLAG_SET);
        } else {
            self.remove(StorageKey::MiniCartOpen);
        }
    }

    // =========================================================================
    // Raw access
    // =========================================================================

    fn read_raw(&self, key: StorageKey) -> Option<String> {
        match self.store.get(key.as_str()) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "Local cache read failed");
                None
            }
        }
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(key = key.as_str(), error = %e, "Ignoring malformed local cache entry");
                None
            }
        }
    }

    fn write_raw(&self, key: StorageKey, value: &str) {
        if let Err(e) = self.store.set(key.as_str(), value) {
            warn!(key = key.as_str(), error = %e, "Local cache write failed");
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.write_raw(key, &json),
            Err(e) => warn!(key = key.as_str(), error = %e, "Failed to encode local cache entry"),
        }
    }

    fn remove(&self, key: StorageKey) {
        if let Err(e) = self.store.remove(key.as_str()) {
            warn!(key = key.as_str(), error = %e, "Local cache remove failed");
        }
    }
}
