//! The customer's wishlist.
//!
//! Listing refreshes every saved product from its detail endpoint so prices
//! and stock are current; a product that fails to refresh keeps the copy
//! embedded in the wishlist.

use bettabeal_core::WishlistId;
use thiserror::Error;
use tracing::instrument;

use crate::api::{ApiError, BackendClient, WishlistItem};
use crate::orders::{Page, paginate};
use crate::session::AuthSession;

/// Wishlist entries per page.
pub const WISHLIST_PER_PAGE: usize = 8;

#[derive(Debug, Error)]
pub enum WishlistError {
    #[error("Failed to remove product from wishlist")]
    Remove(#[source] ApiError),
}

impl WishlistError {
    /// Whether the backend refused the session token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        match self {
            Self::Remove(e) => e.is_unauthorized(),
        }
    }
}

#[derive(Clone)]
pub struct WishlistService {
    backend: BackendClient,
}

impl WishlistService {
    #[must_use]
    pub const fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// One page of saved products with refreshed details.
    ///
    /// A failed listing is an empty wishlist, except that a refused token is
    /// returned so the caller can send the visitor to log in.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` only when the backend rejects the session.
    #[instrument(skip(self, session))]
    pub async fn page(
        &self,
        session: &AuthSession,
        page: usize,
    ) -> Result<Page<WishlistItem>, ApiError> {
        let items = match self.backend.list_wishlist(session).await {
            Ok(items) => items,
            Err(e) if e.is_unauthorized() => return Err(e),
            Err(e) => {
                tracing::error!(error = %e, "Error fetching wishlist");
                Vec::new()
            }
        };

        let mut refreshed = Vec::with_capacity(items.len());
        for mut item in items {
            match self.backend.get_product(session, item.product.product_id).await {
                Ok(product) => item.product = product,
                Err(e) => tracing::warn!(
                    product_id = %item.product.product_id,
                    error = %e,
                    "Keeping wishlist copy of product"
                ),
            }
            refreshed.push(item);
        }

        Ok(paginate(refreshed, page, WISHLIST_PER_PAGE))
    }

    /// # Errors
    ///
    /// Returns `WishlistError::Remove` if the backend refuses.
    #[instrument(skip(self, session))]
    pub async fn remove(
        &self,
        session: &AuthSession,
        wishlist_id: WishlistId,
    ) -> Result<(), WishlistError> {
        self.backend
            .remove_wishlist_item(session, wishlist_id)
            .await
            .map_err(WishlistError::Remove)
    }
}
