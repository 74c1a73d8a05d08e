//! Cart commands.
//!
//! Commands that act on a line load the remote cart first so the line is
//! known to the synchronizer.

use zentro_core::{CartLineId, CartSnapshot, ProductId, SnapshotOrigin};
use zentro_storefront::QuantityUpdate;

use super::{CliError, Session};

/// Print the cart with prices and subtotal.
pub async fn show(session: &Session) -> Result<(), CliError> {
    let mut snapshot = session.sync.load_cart().await;
    report_fallback(session, &snapshot);

    if !snapshot.unpriced_products().is_empty() {
        if let Err(e) = session.catalog().join_into(&mut snapshot).await {
            tracing::warn!(error = %e, "Could not price cached cart");
        }
    }

    print_cart(&snapshot);
    Ok(())
}

/// Add `qty` of a product.
pub async fn add(session: &Session, product_id: ProductId, qty: u32) -> Result<(), CliError> {
    session.sync.add_to_cart(product_id, qty).await?;
    print_badges(session);
    Ok(())
}

/// Set a line's quantity.
pub async fn update(session: &Session, line_id: CartLineId, qty: u32) -> Result<(), CliError> {
    session.sync.load_cart().await;

    match session.sync.update_quantity(line_id, qty).await? {
        QuantityUpdate::Applied => print_badges(session),
        QuantityUpdate::Dropped => {
            tracing::warn!("Another quantity update is in progress, try again");
        }
    }
    Ok(())
}

/// Remove a line.
pub async fn remove(session: &Session, line_id: CartLineId) -> Result<(), CliError> {
    let snapshot = session.sync.load_cart().await;
    if snapshot.line(line_id).is_none() {
        tracing::info!(line_id = %line_id, "Line is not in the cart");
    }

    session.sync.remove_from_cart(line_id).await?;
    print_badges(session);
    Ok(())
}

/// Place an order for the current cart.
pub async fn checkout(session: &Session) -> Result<(), CliError> {
    let snapshot = session.sync.load_cart().await;
    report_fallback(session, &snapshot);
    if snapshot.is_empty() {
        tracing::warn!("Cart is empty, nothing to order");
        return Ok(());
    }

    session.sync.place_order().await?;
    Ok(())
}

/// Print header badge counts after syncing the cart.
pub async fn badges(session: &Session) {
    let snapshot = session.sync.load_cart().await;
    report_fallback(session, &snapshot);
    print_badges(session);
}

fn report_fallback(session: &Session, snapshot: &CartSnapshot) {
    if let Some(e) = session.sync.last_load_error() {
        match snapshot.origin() {
            SnapshotOrigin::LocalCache => tracing::warn!("Showing cached cart: {e}"),
            SnapshotOrigin::Remote => tracing::warn!("Showing last synced cart: {e}"),
        }
    }
}

fn print_badges(session: &Session) {
    let counts = session.sync.badge_counts();

    #[allow(clippy::print_stdout)]
    {
        println!(
            "Cart: {}  Wishlist: {}",
            counts.cart_count, counts.wishlist_count
        );
    }
}

#[allow(clippy::print_stdout)]
fn print_cart(snapshot: &CartSnapshot) {
    if snapshot.is_empty() {
        println!("Your cart is empty");
        return;
    }

    for line in snapshot.lines() {
        let line_id = line
            .line_id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        match snapshot.product(line.product_id) {
            Some(product) => println!(
                "[{line_id}] {} x{} @ {} = {}",
                product.name,
                line.quantity,
                product.price,
                product.price.line_total(line.quantity)
            ),
            None => println!("[{line_id}] product {} x{}", line.product_id, line.quantity),
        }
    }
    println!("Subtotal: {}", snapshot.subtotal());
}
