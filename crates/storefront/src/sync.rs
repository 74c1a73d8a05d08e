//! Cart and wishlist synchronizer.
//!
//! [`CartSynchronizer`] owns the client's view of the cart and wishlist. It is
//! built once and handed to whatever renders cart state; rendering code reads
//! snapshots and never mutates them.
//!
//! # Authority
//!
//! The remote cart is authoritative. The local cache paints the cart
//! immediately at startup and stands in when the backend is unreachable. The
//! wishlist is local only.
//!
//! # Ordering
//!
//! Remote operations may complete in any order, with two exceptions:
//! - `load_cart` responses are applied only if no later `load_cart` has
//!   already been applied.
//! - At most one quantity update is in flight. Updates requested while one is
//!   pending are dropped, not queued.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, instrument, warn};

use zentro_core::{
    BadgeCounts, CartLineId, CartSnapshot, ProductId, Quantity, SnapshotOrigin, WishlistSet,
    WishlistState,
};

use crate::api::CartApi;
use crate::error::{Result, SyncError, add_breadcrumb};
use crate::local::LocalCache;
use crate::notify::{Notifier, ToastLevel};

/// Outcome of a quantity update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityUpdate {
    /// The backend accepted the new quantity and the cart was resynchronized.
    Applied,
    /// Another update was in flight; nothing was sent.
    Dropped,
}

/// Handle to the cart/wishlist state. Clones share the same state.
#[derive(Clone)]
pub struct CartSynchronizer {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn CartApi>,
    cache: LocalCache,
    notifier: Arc<dyn Notifier>,
    state: Mutex<SyncState>,
    quantity_update_pending: AtomicBool,
    /// Ticket handed to the most recently started `load_cart`.
    load_generation: AtomicU64,
}

struct SyncState {
    cart: CartSnapshot,
    wishlist: WishlistSet,
    /// Ticket of the most recently applied `load_cart`.
    applied_generation: u64,
    last_load_error: Option<SyncError>,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify_error(&self, err: &SyncError) {
        self.notifier.notify(&err.to_string(), ToastLevel::Error);
    }
}

/// Holds the single quantity-update slot. Releasing it re-enables the
/// quantity controls.
struct QuantityUpdateSlot<'a> {
    inner: &'a Inner,
}

impl<'a> QuantityUpdateSlot<'a> {
    fn claim(inner: &'a Inner) -> Option<Self> {
        inner
            .quantity_update_pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        inner.notifier.set_quantity_controls_enabled(false);
        Some(Self { inner })
    }
}

impl Drop for QuantityUpdateSlot<'_> {
    fn drop(&mut self) {
        self.inner
            .quantity_update_pending
            .store(false, Ordering::Release);
        self.inner.notifier.set_quantity_controls_enabled(true);
    }
}

impl CartSynchronizer {
    /// Create a synchronizer, painting cart and wishlist from the local cache.
    ///
    /// Call [`load_cart`](Self::load_cart) afterwards to pick up the
    /// authoritative cart.
    #[must_use]
    pub fn new(api: Arc<dyn CartApi>, cache: LocalCache, notifier: Arc<dyn Notifier>) -> Self {
        let cart = cache.read_cart();
        let wishlist = cache.read_wishlist();
        debug!(
            cart_lines = cart.len(),
            wishlist = wishlist.len(),
            "Restored cart state from local cache"
        );

        Self {
            inner: Arc::new(Inner {
                api,
                cache,
                notifier,
                state: Mutex::new(SyncState {
                    cart,
                    wishlist,
                    applied_generation: 0,
                    last_load_error: None,
                }),
                quantity_update_pending: AtomicBool::new(false),
                load_generation: AtomicU64::new(0),
            }),
        }
    }

    // =========================================================================
    // Remote operations
    // =========================================================================

    /// Fetch the remote cart and make it current.
    ///
    /// Never fails. When the backend is unreachable or the user is not logged
    /// in, the last remote cart stays current if there is one, otherwise the
    /// cached cart becomes current. The failure is available from
    /// [`last_load_error`](Self::last_load_error).
    #[instrument(skip(self))]
    pub async fn load_cart(&self) -> CartSnapshot {
        let ticket = self.inner.load_generation.fetch_add(1, Ordering::AcqRel) + 1;
        let result = self.inner.api.fetch_cart().await;

        let mut state = self.inner.state();
        if ticket < state.applied_generation {
            debug!(ticket, applied = state.applied_generation, "Discarding superseded cart response");
            return state.cart.clone();
        }

        // The generation only advances when a snapshot replaces the cart
        match result {
            Ok(cart) => {
                self.inner.cache.write_cart(&cart);
                state.applied_generation = ticket;
                state.cart = cart;
                state.last_load_error = None;
            }
            Err(e) => {
                let err = SyncError::from(e);
                if state.cart.origin() == SnapshotOrigin::Remote {
                    warn!(error = %err, "Cart fetch failed, keeping last remote cart");
                } else {
                    warn!(error = %err, "Cart fetch failed, using local cache");
                    state.applied_generation = ticket;
                    state.cart = self.inner.cache.read_cart();
                }
                state.last_load_error = Some(err);
            }
        }
        state.cart.clone()
    }

    /// Add a product to the cart and resynchronize.
    ///
    /// # Errors
    ///
    /// - `InvalidQuantity` if `quantity` is zero (nothing is sent)
    /// - `Unauthenticated` if the user is not logged in
    /// - `RequestFailed` for any other failure
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_cart(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        let quantity = Quantity::new(quantity).map_err(|_| SyncError::InvalidQuantity(quantity))?;

        if let Err(e) = self.inner.api.add_item(product_id, quantity).await {
            let err = SyncError::from(e);
            self.inner.notify_error(&err);
            return Err(err);
        }

        let product = product_id.to_string();
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product.as_str())]));
        self.inner.notifier.notify("Added to cart", ToastLevel::Success);
        self.load_cart().await;
        Ok(())
    }

    /// Change a line's quantity.
    ///
    /// The displayed quantity changes immediately and is reconciled with the
    /// backend when the request completes. While an update is in flight,
    /// further updates (for any line) are dropped and report
    /// [`QuantityUpdate::Dropped`].
    ///
    /// Decrementing below one is a removal; callers must use
    /// [`remove_from_cart`](Self::remove_from_cart) for that.
    ///
    /// # Errors
    ///
    /// - `InvalidQuantity` if `new_quantity` is zero (nothing is sent)
    /// - `Unauthenticated` / `RequestFailed` if the backend call fails; the
    ///   optimistic quantity is rolled back
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn update_quantity(
        &self,
        line_id: CartLineId,
        new_quantity: u32,
    ) -> Result<QuantityUpdate> {
        let quantity =
            Quantity::new(new_quantity).map_err(|_| SyncError::InvalidQuantity(new_quantity))?;

        let Some(_slot) = QuantityUpdateSlot::claim(&self.inner) else {
            debug!("Quantity update already in flight, dropping request");
            return Ok(QuantityUpdate::Dropped);
        };

        let (previous, generation) = {
            let mut state = self.inner.state();
            let previous = state.cart.set_quantity(line_id, quantity);
            self.inner.cache.write_cart(&state.cart);
            (previous, state.applied_generation)
        };

        match self.inner.api.update_quantity(line_id, quantity).await {
            Ok(()) => {
                self.load_cart().await;
                Ok(QuantityUpdate::Applied)
            }
            Err(e) => {
                let err = SyncError::from(e);
                if let Some(previous) = previous {
                    let mut state = self.inner.state();
                    // A cart loaded while the request was in flight is newer
                    if state.applied_generation == generation {
                        state.cart.set_quantity(line_id, previous);
                        self.inner.cache.write_cart(&state.cart);
                    }
                }
                self.inner.notify_error(&err);
                Err(err)
            }
        }
    }

    /// Remove a line and resynchronize.
    ///
    /// Removing a line that is absent from a remote cart succeeds without
    /// contacting the backend. A cart painted from the local cache has no
    /// line IDs, so the request is always sent in that case.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` / `RequestFailed` if the backend call fails.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn remove_from_cart(&self, line_id: CartLineId) -> Result<()> {
        let known_absent = {
            let state = self.inner.state();
            state.cart.origin() == SnapshotOrigin::Remote && state.cart.line(line_id).is_none()
        };
        if known_absent {
            debug!("Line not in cart, nothing to remove");
            return Ok(());
        }

        if let Err(e) = self.inner.api.remove_item(line_id).await {
            let err = SyncError::from(e);
            self.inner.notify_error(&err);
            return Err(err);
        }

        self.inner
            .notifier
            .notify("Removed from cart", ToastLevel::Success);
        self.load_cart().await;
        Ok(())
    }

    /// Place an order for the current cart.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` / `RequestFailed` if the backend call fails.
    #[instrument(skip(self))]
    pub async fn place_order(&self) -> Result<()> {
        if let Err(e) = self.inner.api.create_order().await {
            let err = SyncError::from(e);
            self.inner.notify_error(&err);
            return Err(err);
        }

        add_breadcrumb("order", "Order placed", None);
        self.inner
            .notifier
            .notify("Order placed successfully", ToastLevel::Success);
        self.load_cart().await;
        Ok(())
    }

    // =========================================================================
    // Local operations
    // =========================================================================

    /// Add the product to the wishlist if absent, remove it if present.
    ///
    /// Persists immediately and never suspends.
    pub fn toggle_wishlist(&self, product_id: ProductId) -> WishlistState {
        let toggled = {
            let mut state = self.inner.state();
            let toggled = state.wishlist.toggle(product_id);
            self.inner.cache.write_wishlist(&state.wishlist);
            toggled
        };

        let message = if toggled.is_wishlisted() {
            "Added to wishlist"
        } else {
            "Removed from wishlist"
        };
        self.inner.notifier.notify(message, ToastLevel::Success);
        toggled
    }

    /// Write cart and wishlist to the local cache. Call before shutdown.
    pub fn flush(&self) {
        let state = self.inner.state();
        self.inner.cache.write_cart(&state.cart);
        self.inner.cache.write_wishlist(&state.wishlist);
    }

    /// Forget the cart and wishlist, in memory and in the local cache. Call on logout.
    pub fn clear(&self) {
        let mut state = self.inner.state();
        state.cart = CartSnapshot::default();
        state.wishlist = WishlistSet::new();
        state.last_load_error = None;
        self.inner.cache.clear_cart_and_wishlist();
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Header badge counts. Pure; no I/O.
    #[must_use]
    pub fn badge_counts(&self) -> BadgeCounts {
        let state = self.inner.state();
        BadgeCounts::from_state(&state.cart, &state.wishlist)
    }

    /// A copy of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.inner.state().cart.clone()
    }

    /// A copy of the current wishlist.
    #[must_use]
    pub fn wishlist(&self) -> WishlistSet {
        self.inner.state().wishlist.clone()
    }

    #[must_use]
    pub fn is_wishlisted(&self, product_id: ProductId) -> bool {
        self.inner.state().wishlist.contains(product_id)
    }

    /// Whether a quantity update is in flight (quantity controls should be disabled).
    #[must_use]
    pub fn is_quantity_update_pending(&self) -> bool {
        self.inner.quantity_update_pending.load(Ordering::Acquire)
    }

    /// Why the most recent `load_cart` fell back to the local cache, if it did.
    #[must_use]
    pub fn last_load_error(&self) -> Option<SyncError> {
        self.inner.state().last_load_error.clone()
    }

    /// The local cache this synchronizer persists to.
    #[must_use]
    pub fn cache(&self) -> &LocalCache {
        &self.inner.cache
    }
}
