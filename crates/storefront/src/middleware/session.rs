//! Server-side session layer.
//!
//! Uses an in-memory tower-sessions store for the cart snapshot and
//! checkout state. Losing it on restart is harmless: both are rebuilt from
//! the backend on the next page load.

use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "bb_session";

/// Create the session layer with an in-memory store.
///
/// The session expires with the same inactivity window as the auth cookies.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            config.session_max_age_seconds,
        )))
        .with_secure(config.secure_cookies())
        .with_same_site(SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
