//! Authentication route handlers.
//!
//! Login and sign-up are delegated to the backend; on success the bearer
//! token and user id are written to the `USR`/`UID` cookies and the visitor
//! is sent to the landing page for their role. New accounts are customers.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use bettabeal_core::UserRole;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::ApiError;
use crate::error::{LOGIN_PATH, Result, clear_sentry_user, set_sentry_user};
use crate::registration::RegistrationForm;
use crate::session::store;
use crate::state::AppState;

/// Shown for any rejected login, whatever the backend said.
pub const LOGIN_FAILED: &str = "Login failed, please check your username/password!";

/// Shown when the backend refuses a sign-up.
pub const REGISTRATION_FAILED: &str = "Registration failed, please check your details!";

/// Shown when the sign-up could not be submitted at all.
pub const REGISTRATION_UNAVAILABLE: &str = "An error occurred. Please try again later.";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Handle login submission.
#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn login(State(state): State<AppState>, Json(form): Json<LoginForm>) -> Response {
    let password = SecretString::from(form.password);

    match state.backend().login(&form.username, &password).await {
        Ok((session, user)) => {
            set_sentry_user(&user.user_id);
            tracing::info!(user_id = %user.user_id, role = ?user.role, "Login successful");

            let mut headers = HeaderMap::new();
            state.sessions().store(&mut headers, &session);
            (headers, Redirect::to(user.role.home_path())).into_response()
        }
        Err(ApiError::Rejected { message }) => {
            tracing::info!(message = %message, "Login rejected");
            (StatusCode::UNAUTHORIZED, Json(json!({ "error": LOGIN_FAILED }))).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Login failed");
            (StatusCode::BAD_GATEWAY, Json(json!({ "error": LOGIN_FAILED }))).into_response()
        }
    }
}

/// Handle customer sign-up.
///
/// Incomplete or malformed forms are refused locally with 400.
#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegistrationForm>,
) -> Result<Response> {
    let registration = form.validate()?;

    let response = match state.backend().register(&registration.request()).await {
        Ok((session, user)) => {
            if let Some(user) = &user {
                set_sentry_user(&user.user_id);
            }
            tracing::info!(
                user_id = ?user.as_ref().map(|user| user.user_id),
                "Registration successful"
            );

            let mut headers = HeaderMap::new();
            state.sessions().store(&mut headers, &session);
            (headers, Redirect::to(UserRole::Customer.home_path())).into_response()
        }
        Err(ApiError::Rejected { message }) => {
            tracing::info!(message = %message, "Registration rejected");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": REGISTRATION_FAILED })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Registration failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": REGISTRATION_UNAVAILABLE })),
            )
                .into_response()
        }
    };
    Ok(response)
}

/// Handle logout.
///
/// Expires both auth cookies and drops server-side state.
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Err(e) = store::clear(&session).await {
        tracing::warn!(error = %e, "Failed to clear session on logout");
    }
    clear_sentry_user();

    let mut headers = HeaderMap::new();
    state.sessions().clear(&mut headers);
    (headers, Redirect::to(LOGIN_PATH)).into_response()
}
