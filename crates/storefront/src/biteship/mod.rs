//! Biteship courier API client.
//!
//! Two endpoints are used: courier rate quotes for checkout and the area
//! directory that supplies an address's `biteship_id`. Area lookups are
//! cached using `moka` (5-minute TTL); rate quotes never are, since they
//! depend on the order being paid for.

pub mod types;

pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::instrument;

use crate::config::BiteshipConfig;

/// Errors that can occur when interacting with the Biteship API.
///
/// `Display` renders the string shown on the checkout page.
#[derive(Debug, Error)]
pub enum BiteshipError {
    /// Network failure.
    #[error("Fetch error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; the body is passed through verbatim.
    #[error("Error: {status} - {body}")]
    Status { status: u16, body: String },

    /// 2xx response with `success: false`.
    #[error("Error: {message}")]
    Rejected { message: String },

    /// Body was not valid JSON for the expected shape.
    #[error("Fetch error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client for the Biteship REST API.
#[derive(Clone)]
pub struct BiteshipClient {
    inner: Arc<BiteshipClientInner>,
}

impl std::fmt::Debug for BiteshipClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiteshipClient")
            .field("base_url", &self.inner.base_url)
            .field("api_token", &"[REDACTED]")
            .field("origin_area_id", &self.inner.origin_area_id)
            .field("couriers", &self.inner.couriers)
            .finish_non_exhaustive()
    }
}

struct BiteshipClientInner {
    client: reqwest::Client,
    base_url: String,
    api_token: SecretString,
    origin_area_id: String,
    couriers: String,
    areas: Cache<String, Vec<Area>>,
}

impl BiteshipClient {
    /// Create a new Biteship client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &BiteshipConfig) -> Result<Self, BiteshipError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a Biteship client around an existing `reqwest` client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: &BiteshipConfig) -> Self {
        let areas = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(BiteshipClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                api_token: config.api_token.clone(),
                origin_area_id: config.origin_area_id.clone(),
                couriers: config.couriers.clone(),
                areas,
            }),
        }
    }

    /// Quote every allowed courier for shipping `items` to `destination_area_id`.
    ///
    /// # Errors
    ///
    /// Returns `BiteshipError` on network failure, non-2xx, or `success: false`.
    #[instrument(skip(self, items), fields(item_count = items.len()))]
    pub async fn rates(
        &self,
        destination_area_id: &str,
        items: &[RateItem],
    ) -> Result<Vec<CourierRate>, BiteshipError> {
        let body = RateRequest {
            origin_area_id: &self.inner.origin_area_id,
            destination_area_id,
            couriers: &self.inner.couriers,
            items,
        };

        let response = self
            .inner
            .client
            .post(format!("{}/v1/rates/couriers", self.inner.base_url))
            .bearer_auth(self.inner.api_token.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %text.chars().take(500).collect::<String>(),
                "Error fetching courier options"
            );
            return Err(BiteshipError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let data: RateResponse = serde_json::from_str(&text)?;
        if !data.success {
            return Err(BiteshipError::Rejected {
                message: data.message.unwrap_or_default(),
            });
        }

        tracing::debug!(count = data.pricing.len(), "Courier options fetched");
        Ok(data.pricing)
    }

    /// Search the area directory.
    ///
    /// Empty input returns no areas without calling the API.
    ///
    /// # Errors
    ///
    /// Returns `BiteshipError` on network failure or undecodable body.
    #[instrument(skip(self))]
    pub async fn search_areas(&self, input: &str) -> Result<Vec<Area>, BiteshipError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let key = input.to_lowercase();
        if let Some(areas) = self.inner.areas.get(&key).await {
            tracing::debug!("Cache hit for area search");
            return Ok(areas);
        }

        let url = format!(
            "{}/v1/maps/areas?countries=ID&input={}&type=single",
            self.inner.base_url,
            encode_area_input(input)
        );
        let response = self
            .inner
            .client
            .get(url)
            .bearer_auth(self.inner.api_token.expose_secret())
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(BiteshipError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let data: AreaResponse = serde_json::from_str(&text)?;
        if !data.success {
            return Ok(Vec::new());
        }

        self.inner.areas.insert(key, data.areas.clone()).await;
        Ok(data.areas)
    }
}

/// Percent-encode a search term, with spaces as `+`.
fn encode_area_input(input: &str) -> String {
    urlencoding::encode(input).replace("%20", "+")
}
