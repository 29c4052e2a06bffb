//! Login, registration and token verification endpoints.

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use super::{ApiError, BackendClient, LoginRequest, LoginResponse, LoginUser, RegisterRequest};
use crate::session::AuthSession;

impl BackendClient {
    /// Exchange credentials for a bearer token.
    ///
    /// The login endpoint does not use the usual envelope: success is the
    /// presence of `token` and `user`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` on bad credentials, other variants on
    /// transport failures.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<(AuthSession, LoginUser), ApiError> {
        let response = self
            .http()
            .post(self.url("login"))
            .json(&LoginRequest {
                username,
                password: password.expose_secret(),
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // Bad credentials come back as 401 with a message body; treat them
        // the same as a 200 without a token.
        if !status.is_success() && status.as_u16() != 401 {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let login: LoginResponse = if status.is_success() {
            serde_json::from_str(&body)?
        } else {
            serde_json::from_str(&body).unwrap_or(LoginResponse {
                token: None,
                user: None,
                message: None,
            })
        };
        match (login.token, login.user) {
            (Some(token), Some(user)) if !token.is_empty() => {
                Ok((AuthSession::new(token, Some(user.user_id)), user))
            }
            _ => Err(ApiError::Rejected {
                message: login
                    .message
                    .unwrap_or_else(|| "invalid credentials".to_string()),
            }),
        }
    }

    /// Create a customer account and sign it in.
    ///
    /// Like login, the response is not enveloped: a token means success.
    /// The user is optional; without it only the token cookie can be set.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` when the backend answers without a token
    /// (taken username, invalid details), other variants on transport or
    /// server failures.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(
        &self,
        request: &RegisterRequest<'_>,
    ) -> Result<(AuthSession, Option<LoginUser>), ApiError> {
        let response = self
            .http()
            .post(self.url("register/customer"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_server_error() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let registered: LoginResponse = if status.is_success() {
            serde_json::from_str(&body)?
        } else {
            serde_json::from_str(&body).unwrap_or(LoginResponse {
                token: None,
                user: None,
                message: None,
            })
        };
        match registered.token {
            Some(token) if !token.is_empty() => {
                let user_id = registered.user.as_ref().map(|user| user.user_id);
                Ok((AuthSession::new(token, user_id), registered.user))
            }
            _ => Err(ApiError::Rejected {
                message: registered
                    .message
                    .unwrap_or_else(|| "registration refused".to_string()),
            }),
        }
    }

    /// Check that the session token is still accepted by the backend.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the token is stale or the call fails.
    #[instrument(skip(self, session))]
    pub async fn verify_session(&self, session: &AuthSession) -> Result<(), ApiError> {
        let request = Self::authorized(self.http().get(self.url("authentication")), session);
        self.send::<serde_json::Value>(request).await?;
        Ok(())
    }
}
