//! Local preferences and logout.

use super::Session;

#[allow(clippy::print_stdout)]
pub fn show_city(session: &Session) {
    println!("Delivering to {}", session.cache.city());
}

pub fn set_city(session: &Session, city: &str) {
    session.cache.set_city(city);
    tracing::info!(city = %session.cache.city(), "Delivery city updated");
}

/// Forget the cached cart and wishlist. The session cookie lives in the
/// environment and is left alone.
pub fn logout(session: &Session) {
    session.sync.clear();
    tracing::info!("Cleared local cart and wishlist");
}
