//! BettaBeal storefront library.
//!
//! A backend-for-frontend in front of the BettaBeal REST API and the
//! Biteship courier API: session cookies, sign-up, catalog, cart, wishlist,
//! addresses, shipping rates, checkout and order management. Exposed as a library so the binary and
//! the integration tests build the same router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod addresses;
pub mod api;
pub mod biteship;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod middleware;
pub mod orders;
pub mod registration;
pub mod routes;
pub mod session;
pub mod shipping;
pub mod state;
pub mod toast;
pub mod wishlist;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use state::AppState;

/// Build the application router with its full middleware stack.
///
/// Layer order, outermost first: Sentry, request tracing, request id, then
/// the server-side session.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    routes::routes()
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &axum::http::Request<_>| {
                            tracing::info_span!(
                                "http_request",
                                method = %request.method(),
                                uri = %request.uri(),
                                request_id = tracing::field::Empty,
                                user_id = tracing::field::Empty,
                                status = tracing::field::Empty,
                                latency_ms = tracing::field::Empty,
                            )
                        })
                        .on_response(
                            |response: &axum::http::Response<_>,
                             latency: std::time::Duration,
                             span: &Span| {
                                span.record("status", response.status().as_u16());
                                span.record(
                                    "latency_ms",
                                    u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                                );
                                DefaultOnResponse::default().on_response(response, latency, span);
                            },
                        ),
                )
                .layer(axum::middleware::from_fn(middleware::request_id_middleware))
                .layer(session_layer),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
