//! BettaBeal REST backend client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`, bearer-authenticated per call
//!   except for sign-up and the public catalog
//! - The backend is the source of truth - NO local sync, direct API calls
//! - No retries and no caching: a failed call surfaces to the caller, who
//!   decides whether it is page-critical or a transient notice
//!
//! # Response envelope
//!
//! Every endpoint wraps its payload as `{ status?, code?, message?, data? }`.
//! A 2xx response is only a success when `status == "success"` or
//! `code == "000"`; anything else is an upstream business failure and maps
//! to [`ApiError::Rejected`].

mod addresses;
mod auth;
mod cart;
mod orders;
mod products;
mod wishlist;
pub mod types;

pub use types::*;

use std::sync::Arc;

use reqwest::RequestBuilder;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::BackendConfig;
use crate::session::AuthSession;

/// Business-level success code used by the order and address endpoints.
const SUCCESS_CODE: &str = "000";

/// Business-level success status used by the cart and product endpoints.
const SUCCESS_STATUS: &str = "success";

/// Errors that can occur when interacting with the REST backend.
///
/// `Display` renders the human-readable string shown to the user.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network failure or undecodable body.
    #[error("Fetch error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response.
    #[error("Error: {status} - {body}")]
    Status { status: u16, body: String },

    /// 2xx response whose envelope reports failure.
    #[error("Error: {message}")]
    Rejected { message: String },

    /// Successful envelope without the expected `data` payload.
    #[error("Error: response missing {0}")]
    MissingData(&'static str),

    /// Body was not valid JSON for the expected shape.
    #[error("Error: invalid response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether the backend refused the bearer token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }
}

/// Response envelope shared by all backend endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    fn is_success(&self) -> bool {
        self.status.as_deref() == Some(SUCCESS_STATUS) || self.code.as_deref() == Some(SUCCESS_CODE)
    }

    /// Take the payload, failing if the envelope had none.
    pub fn into_data(self, what: &'static str) -> Result<T, ApiError> {
        self.data.ok_or(ApiError::MissingData(what))
    }
}

/// Client for the BettaBeal REST backend.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, &config.base_url))
    }

    /// Create a backend client around an existing `reqwest` client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
            }),
        }
    }

    /// Build an absolute URL for an API path.
    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    fn http(&self) -> &reqwest::Client {
        &self.inner.client
    }

    /// Attach the session's bearer token.
    fn authorized(request: RequestBuilder, session: &AuthSession) -> RequestBuilder {
        request.bearer_auth(session.token().expose_secret())
    }

    /// Send a request and decode the response envelope.
    ///
    /// Non-2xx statuses and business failures are turned into errors, so the
    /// returned envelope is always a successful one.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Envelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse backend response"
                );
                return Err(ApiError::Parse(e));
            }
        };

        if !envelope.is_success() {
            let message = envelope
                .message
                .unwrap_or_else(|| "request was not successful".to_string());
            tracing::debug!(message = %message, "Backend rejected request");
            return Err(ApiError::Rejected { message });
        }

        Ok(envelope)
    }
}
