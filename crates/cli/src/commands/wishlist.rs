//! Wishlist commands. These never touch the network.

use zentro_core::ProductId;

use super::Session;

#[allow(clippy::print_stdout)]
pub fn show(session: &Session) {
    let wishlist = session.sync.wishlist();
    if wishlist.is_empty() {
        println!("Your wishlist is empty");
        return;
    }
    for product_id in wishlist.iter() {
        println!("{product_id}");
    }
}

pub fn toggle(session: &Session, product_id: ProductId) {
    session.sync.toggle_wishlist(product_id);
    let counts = session.sync.badge_counts();
    tracing::debug!(wishlist = counts.wishlist_count, "Wishlist updated");
}
