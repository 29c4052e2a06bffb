//! Per-visitor state kept in the server-side session.
//!
//! The cart snapshot and each checkout's state live in the tower-sessions
//! store between requests. Checkouts are keyed by order id so two tabs
//! paying for different orders do not clobber each other.

use bettabeal_core::OrderId;
use tower_sessions::Session;

use crate::cart::CartSnapshot;
use crate::checkout::CheckoutState;

/// Session keys.
pub mod keys {
    pub const CART: &str = "cart";
    pub const CHECKOUT_PREFIX: &str = "checkout:";
}

fn checkout_key(order_id: OrderId) -> String {
    format!("{}{order_id}", keys::CHECKOUT_PREFIX)
}

/// Load the cart snapshot, if one was stored.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load_cart(session: &Session) -> Result<Option<CartSnapshot>, tower_sessions::session::Error> {
    session.get(keys::CART).await
}

/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_cart(
    session: &Session,
    snapshot: &CartSnapshot,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CART, snapshot).await
}

/// Load a checkout's state, if one was stored for the order.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load_checkout(
    session: &Session,
    order_id: OrderId,
) -> Result<Option<CheckoutState>, tower_sessions::session::Error> {
    session.get(&checkout_key(order_id)).await
}

/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_checkout(
    session: &Session,
    state: &CheckoutState,
) -> Result<(), tower_sessions::session::Error> {
    match state.order_id() {
        Some(order_id) => session.insert(&checkout_key(order_id), state).await,
        None => Ok(()),
    }
}

/// Forget everything stored for the visitor (logout).
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn clear(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_key() {
        assert_eq!(checkout_key(OrderId::new(42)), "checkout:42");
    }
}
