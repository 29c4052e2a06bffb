//! Authentication extractors.
//!
//! The bearer token travels in the `USR` cookie. Handlers that touch the
//! backend on the visitor's behalf take [`RequireSession`]; when the cookie
//! is absent the request is redirected to `/login` before any upstream
//! call is made. Seller pages take [`RequireVerifiedSession`], which also
//! asks the backend whether the token is still good.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};

use crate::api::ApiError;
use crate::error::{AppError, LOGIN_PATH};
use crate::session::AuthSession;
use crate::state::AppState;

/// Extractor that requires an authenticated session.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireSession(session): RequireSession,
/// ) -> impl IntoResponse {
///     format!("Hello, user {:?}!", session.user_id())
/// }
/// ```
pub struct RequireSession(pub AuthSession);

/// Rejection for requests without a session token.
#[derive(Debug)]
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        Redirect::to(LOGIN_PATH).into_response()
    }
}

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = state.sessions().load(&parts.headers).ok_or_else(|| {
            tracing::debug!(path = %parts.uri.path(), "No session token, redirecting to login");
            AuthRejection
        })?;

        if let Some(user_id) = session.user_id() {
            tracing::Span::current().record("user_id", user_id.as_i64());
        }

        Ok(Self(session))
    }
}

/// Extractor that requires a session the backend still accepts.
///
/// A stale token (`401`, or an envelope that is not `000`) is handled like
/// a missing one: redirect to `/login`.
pub struct RequireVerifiedSession(pub AuthSession);

impl FromRequestParts<AppState> for RequireVerifiedSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireSession(session) = RequireSession::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Unauthenticated)?;

        match state.backend().verify_session(&session).await {
            Ok(()) => Ok(Self(session)),
            Err(ApiError::Rejected { message }) => {
                tracing::info!(message = %message, "Session token no longer accepted");
                Err(AppError::Unauthenticated)
            }
            Err(e) => Err(e.into()),
        }
    }
}
