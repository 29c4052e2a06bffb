//! Wishlist endpoints.

use bettabeal_core::WishlistId;
use tracing::instrument;

use super::{ApiError, BackendClient, WishlistItem};
use crate::session::AuthSession;

impl BackendClient {
    /// The customer's saved products.
    ///
    /// An envelope without `data` is an empty wishlist.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session))]
    pub async fn list_wishlist(&self, session: &AuthSession) -> Result<Vec<WishlistItem>, ApiError> {
        let request = Self::authorized(self.http().get(self.url("wishlist")), session);
        Ok(self
            .send::<Vec<WishlistItem>>(request)
            .await?
            .data
            .unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session))]
    pub async fn remove_wishlist_item(
        &self,
        session: &AuthSession,
        wishlist_id: WishlistId,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("wishlist/{wishlist_id}"));
        let request = Self::authorized(self.http().delete(url), session);
        self.send::<serde_json::Value>(request).await?;
        Ok(())
    }
}
