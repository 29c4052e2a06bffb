//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BETTABEAL_API_URL` - Base URL of the BettaBeal REST backend
//! - `BITESHIP_API_TOKEN` - Bearer token for the Biteship courier API
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (`https://` enables secure cookies)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SESSION_MAX_AGE_SECONDS` - Lifetime of the `USR`/`UID` cookies (default: 3600)
//! - `BITESHIP_BASE_URL` - Courier API base URL (default: <https://api.biteship.com>)
//! - `BITESHIP_ORIGIN_AREA_ID` - Area the shop ships from
//! - `BITESHIP_COURIERS` - Comma-separated courier allow-list (default: paxel,jne,tiki,jnt)
//! - `CHECKOUT_ON_PAYMENT_SUCCESS` - `mark_paid` or `redirect` (default: `mark_paid`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

use crate::checkout::PaymentSuccessMode;

/// Origin area of the shop's warehouse in Biteship's area directory.
pub const DEFAULT_ORIGIN_AREA_ID: &str = "IDNP9IDNC74IDND6715IDZ16128";

/// Couriers offered at checkout.
pub const DEFAULT_COURIERS: &str = "paxel,jne,tiki,jnt";

/// Default lifetime of the session cookies (one hour).
const DEFAULT_SESSION_MAX_AGE_SECONDS: i64 = 3600;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Lifetime of the `USR`/`UID` cookies in seconds
    pub session_max_age_seconds: i64,
    /// REST backend configuration
    pub backend: BackendConfig,
    /// Courier rate API configuration
    pub biteship: BiteshipConfig,
    /// Checkout behaviour
    pub checkout: CheckoutConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// REST backend configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL, without trailing slash (e.g. <https://api.bettabeal.my.id>)
    pub base_url: String,
}

/// Biteship courier API configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct BiteshipConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Bearer token
    pub api_token: SecretString,
    /// Area the parcels ship from
    pub origin_area_id: String,
    /// Comma-separated courier codes
    pub couriers: String,
}

impl std::fmt::Debug for BiteshipConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiteshipConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"[REDACTED]")
            .field("origin_area_id", &self.origin_area_id)
            .field("couriers", &self.couriers)
            .finish()
    }
}

/// Checkout behaviour configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckoutConfig {
    /// What to do once the payment widget reports success
    pub on_payment_success: PaymentSuccessMode,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let session_max_age_seconds = get_env_or_default(
            "SESSION_MAX_AGE_SECONDS",
            &DEFAULT_SESSION_MAX_AGE_SECONDS.to_string(),
        )
        .parse::<i64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("SESSION_MAX_AGE_SECONDS".to_string(), e.to_string())
        })?;

        let backend = BackendConfig::from_env()?;
        let biteship = BiteshipConfig::from_env()?;
        let checkout = CheckoutConfig::from_env()?;

        Ok(Self {
            host,
            port,
            base_url,
            session_max_age_seconds,
            backend,
            biteship,
            checkout,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: trim_base_url(get_required_env("BETTABEAL_API_URL")?),
        })
    }
}

impl BiteshipConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: trim_base_url(get_env_or_default(
                "BITESHIP_BASE_URL",
                "https://api.biteship.com",
            )),
            api_token: get_required_secret("BITESHIP_API_TOKEN")?,
            origin_area_id: get_env_or_default("BITESHIP_ORIGIN_AREA_ID", DEFAULT_ORIGIN_AREA_ID),
            couriers: get_env_or_default("BITESHIP_COURIERS", DEFAULT_COURIERS),
        })
    }
}

impl CheckoutConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let on_payment_success = match get_optional_env("CHECKOUT_ON_PAYMENT_SUCCESS") {
            Some(value) => value.parse().map_err(|e: String| {
                ConfigError::InvalidEnvVar("CHECKOUT_ON_PAYMENT_SUCCESS".to_string(), e)
            })?,
            None => PaymentSuccessMode::default(),
        };
        Ok(Self { on_payment_success })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: base_url.to_string(),
            session_max_age_seconds: 3600,
            backend: BackendConfig {
                base_url: "http://localhost:8000".to_string(),
            },
            biteship: BiteshipConfig {
                base_url: "https://api.biteship.com".to_string(),
                api_token: SecretString::from("biteship_live_token_value"),
                origin_area_id: DEFAULT_ORIGIN_AREA_ID.to_string(),
                couriers: DEFAULT_COURIERS.to_string(),
            },
            checkout: CheckoutConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config("http://localhost:3000");
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_secure_cookies_follow_scheme() {
        assert!(!test_config("http://localhost:3000").secure_cookies());
        assert!(test_config("https://bettabeal.my.id").secure_cookies());
    }

    #[test]
    fn test_biteship_config_debug_redacts_token() {
        let config = test_config("http://localhost:3000");
        let debug_output = format!("{:?}", config.biteship);

        assert!(debug_output.contains(DEFAULT_ORIGIN_AREA_ID));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("biteship_live_token_value"));
    }

    #[test]
    fn test_trim_base_url() {
        assert_eq!(
            trim_base_url("https://api.bettabeal.my.id/".to_string()),
            "https://api.bettabeal.my.id"
        );
    }
}
