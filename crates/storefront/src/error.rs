//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side failures to
//! Sentry before responding. All route handlers return `Result<T, AppError>`.
//!
//! Failures are rendered as `{"error": "..."}` carrying the same
//! human-readable string the visitor sees. A missing or rejected session is
//! not an error page: it redirects to `/login`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::addresses::{AddressError, AddressFormError};
use crate::api::ApiError;
use crate::cart::CartError;
use crate::checkout::CheckoutError;
use crate::orders::OrdersError;
use crate::registration::RegistrationFormError;
use crate::wishlist::WishlistError;

/// Path unauthenticated visitors are sent to.
pub const LOGIN_PATH: &str = "/login";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// No session, or the backend refused its token.
    #[error("User is not authenticated")]
    Unauthenticated,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Orders(#[from] OrdersError),

    #[error(transparent)]
    Wishlist(#[from] WishlistError),

    #[error(transparent)]
    Registration(#[from] RegistrationFormError),

    /// Session store failure.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn is_unauthorized(&self) -> bool {
        match self {
            Self::Unauthenticated => true,
            Self::Api(e) => e.is_unauthorized(),
            Self::Cart(e) => e.is_unauthorized(),
            Self::Address(AddressError::Api(e)) => e.is_unauthorized(),
            Self::Checkout(e) => e.is_unauthorized(),
            Self::Orders(e) => e.is_unauthorized(),
            Self::Wishlist(e) => e.is_unauthorized(),
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::SEE_OTHER,
            Self::Api(_) | Self::Cart(CartError::Fetch(_) | CartError::Add(_) | CartError::Update(_) | CartError::Remove(_)) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Cart(CartError::UnknownItem(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Address(AddressError::Invalid(_)) | Self::Registration(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Wishlist(_) => StatusCode::BAD_GATEWAY,
            Self::Address(AddressError::Api(_)) => StatusCode::BAD_GATEWAY,
            Self::Checkout(err) => match err {
                CheckoutError::InvalidTransition { .. } => StatusCode::CONFLICT,
                CheckoutError::UnknownCourier(_) | CheckoutError::NoAddressSelected => {
                    StatusCode::BAD_REQUEST
                }
                CheckoutError::MissingSnapToken | CheckoutError::Api(_) => StatusCode::BAD_GATEWAY,
            },
            Self::Orders(err) => match err {
                OrdersError::NotPaid(_) | OrdersError::NotShipped(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                OrdersError::Api(_) => StatusCode::BAD_GATEWAY,
            },
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Address(AddressError::Invalid(AddressFormError::MissingField(_)))
            | Self::Registration(RegistrationFormError::MissingField(_)) => {
                "Please fill the required fields".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_unauthorized() {
            tracing::debug!(error = %self, "Redirecting to login");
            return Redirect::to(LOGIN_PATH).into_response();
        }

        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for checkout and cart actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use axum::http::header;
    use bettabeal_core::OrderId;

    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_unauthenticated_redirects_to_login() {
        let response = AppError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
            Some(LOGIN_PATH)
        );
    }

    #[test]
    fn test_backend_401_redirects_to_login() {
        let err = AppError::Api(ApiError::Status {
            status: 401,
            body: "Unauthenticated".to_string(),
        });
        assert_eq!(status_of(err), StatusCode::SEE_OTHER);
    }

    #[test]
    fn test_upstream_failures_are_bad_gateway() {
        let err = AppError::Api(ApiError::Rejected {
            message: "Order not found".to_string(),
        });
        assert_eq!(err.message(), "Error: Order not found");
        assert_eq!(status_of(err), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_checkout_and_orders_statuses() {
        assert_eq!(
            status_of(AppError::Checkout(CheckoutError::InvalidTransition {
                from: "idle",
                event: "start payment",
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Checkout(CheckoutError::NoAddressSelected)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Orders(OrdersError::NotPaid(vec![OrderId::new(1)]))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_registration_form_errors_are_bad_requests() {
        let err = AppError::Registration(RegistrationFormError::MissingField("email"));
        assert_eq!(err.message(), "Please fill the required fields");
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);

        let err = AppError::Registration(RegistrationFormError::BirthDate);
        assert_eq!(err.message(), "Invalid birth date, expected YYYY-MM-DD");
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Internal("pool exhausted".to_string());
        assert_eq!(err.message(), "Internal server error");
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
