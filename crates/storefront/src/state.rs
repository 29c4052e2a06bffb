//! Application state shared across handlers.

use std::sync::Arc;

use url::Url;

use crate::addresses::AddressDirectory;
use crate::api::{ApiError, BackendClient};
use crate::biteship::{BiteshipClient, BiteshipError};
use crate::cart::CartClient;
use crate::catalog::CatalogService;
use crate::checkout::CheckoutOrchestrator;
use crate::config::StorefrontConfig;
use crate::orders::OrderService;
use crate::session::SessionRepository;
use crate::shipping::ShippingRateResolver;
use crate::wishlist::WishlistService;

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("invalid base_url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("base_url must have a host")]
    MissingHost,
    #[error("backend client: {0}")]
    Backend(#[from] ApiError),
    #[error("biteship client: {0}")]
    Biteship(#[from] BiteshipError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// upstream clients and the services built on them.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: BackendClient,
    sessions: SessionRepository,
    cart: CartClient,
    addresses: AddressDirectory,
    checkout: CheckoutOrchestrator,
    orders: OrderService,
    catalog: CatalogService,
    wishlist: WishlistService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured URL is invalid or an HTTP client
    /// fails to build.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        validate_url(&config.base_url)?;
        validate_url(&config.backend.base_url)?;
        validate_url(&config.biteship.base_url)?;

        let backend = BackendClient::new(&config.backend)?;
        let biteship = BiteshipClient::new(&config.biteship)?;
        let sessions = SessionRepository::new(config.secure_cookies(), config.session_max_age_seconds);

        let cart = CartClient::new(backend.clone());
        let addresses = AddressDirectory::new(backend.clone(), biteship.clone());
        let checkout = CheckoutOrchestrator::new(
            backend.clone(),
            ShippingRateResolver::new(biteship),
            config.checkout.on_payment_success,
        );
        let orders = OrderService::new(backend.clone());
        let catalog = CatalogService::new(backend.clone());
        let wishlist = WishlistService::new(backend.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                sessions,
                cart,
                addresses,
                checkout,
                orders,
                catalog,
                wishlist,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the REST backend client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the session cookie repository.
    #[must_use]
    pub fn sessions(&self) -> &SessionRepository {
        &self.inner.sessions
    }

    #[must_use]
    pub fn cart(&self) -> &CartClient {
        &self.inner.cart
    }

    #[must_use]
    pub fn addresses(&self) -> &AddressDirectory {
        &self.inner.addresses
    }

    #[must_use]
    pub fn checkout(&self) -> &CheckoutOrchestrator {
        &self.inner.checkout
    }

    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    #[must_use]
    pub fn wishlist(&self) -> &WishlistService {
        &self.inner.wishlist
    }
}

fn validate_url(raw: &str) -> Result<(), StateError> {
    let url = Url::parse(raw)?;
    if url.host_str().is_none() {
        return Err(StateError::MissingHost);
    }
    Ok(())
}
