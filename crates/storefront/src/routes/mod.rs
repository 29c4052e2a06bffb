//! HTTP route handlers for storefront.
//!
//! Every handler answers with JSON view data; presentation is the client's
//! business.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Health check
//!
//! # Auth
//! POST /login                           - Login, sets USR/UID cookies
//! POST /register                        - Customer sign-up, sets them too
//! POST /logout                          - Logout, expires them
//!
//! # Catalog (public)
//! GET  /catalog                         - Active categories and best sellers
//! GET  /catalog/{product_id}            - Product detail with reviews
//!
//! # Cart (requires auth)
//! GET    /cart                          - Cart with stock bounds
//! POST   /cart/add                      - Add a product
//! POST   /cart/items/{id}/increment     - One more unit
//! POST   /cart/items/{id}/decrement     - One less unit (floor 1)
//! PUT    /cart/items/{id}               - Set quantity (1..=stock)
//! DELETE /cart/items/{id}               - Remove line
//!
//! # Wishlist (requires auth)
//! GET    /wishlist?page=                - Saved products, refreshed
//! DELETE /wishlist/{id}                 - Remove one
//!
//! # Addresses (requires auth)
//! GET  /addresses                       - List, with default selection
//! POST /addresses                       - Create
//! GET  /addresses/areas?input=          - Area autocomplete
//! GET  /addresses/districts             - Districts
//! GET  /addresses/districts/{id}/postcodes - Postcodes
//! GET|PUT|DELETE /addresses/{id}        - Show / replace / delete
//!
//! # Checkout (requires auth)
//! POST /checkout                        - Create order from address
//! GET  /checkout/{order_id}             - Order summary and courier options
//! POST /checkout/{order_id}/courier     - Select courier
//! POST /checkout/{order_id}/payment     - Snap token for the widget
//! POST /checkout/{order_id}/payment/result - Widget outcome
//!
//! # Orders (requires auth)
//! GET  /orders?page=                    - Customer order history
//!
//! # Seller dashboard (requires a token the backend still accepts)
//! GET  /dashboard/orders?page=&status=  - Seller orders
//! PUT  /dashboard/orders/shipping-status - Bulk shipping update
//! ```

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod dashboard;
pub mod orders;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/items/{id}", put(cart::set_quantity).delete(cart::remove))
        .route("/items/{id}/increment", post(cart::increment))
        .route("/items/{id}/decrement", post(cart::decrement))
}

/// Create the public catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/{product_id}", get(catalog::show))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::index))
        .route("/{id}", delete(wishlist::remove))
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(addresses::index).post(addresses::create))
        .route("/areas", get(addresses::areas))
        .route("/districts", get(addresses::districts))
        .route("/districts/{id}/postcodes", get(addresses::postcodes))
        .route(
            "/{id}",
            get(addresses::show)
                .put(addresses::update)
                .delete(addresses::delete),
        )
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::create))
        .route("/{order_id}", get(checkout::show))
        .route("/{order_id}/courier", post(checkout::select_courier))
        .route("/{order_id}/payment", post(checkout::start_payment))
        .route("/{order_id}/payment/result", post(checkout::payment_result))
}

/// Create the seller dashboard routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(dashboard::orders))
        .route(
            "/orders/shipping-status",
            put(dashboard::update_shipping_status),
        )
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/orders", get(orders::index))
        .nest("/catalog", catalog_routes())
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/addresses", address_routes())
        .nest("/checkout", checkout_routes())
        .nest("/dashboard", dashboard_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check upstreams.
async fn health() -> &'static str {
    "ok"
}
