//! Cart endpoints.

use bettabeal_core::{CartItemId, ProductId};
use tracing::instrument;

use super::{AddToCartRequest, ApiError, BackendClient, CartData, UpdateCartItemRequest};
use crate::session::AuthSession;

impl BackendClient {
    /// Fetch the visitor's cart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session))]
    pub async fn get_cart(&self, session: &AuthSession) -> Result<CartData, ApiError> {
        let request = Self::authorized(self.http().get(self.url("cart")), session);
        self.send::<CartData>(request).await?.into_data("cart")
    }

    /// Add `quantity` units of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session))]
    pub async fn add_to_cart(
        &self,
        session: &AuthSession,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let request = Self::authorized(self.http().post(self.url("cart/add")), session)
            .json(&AddToCartRequest {
                product_id,
                quantity,
            });
        self.send::<serde_json::Value>(request).await?;
        Ok(())
    }

    /// Decrease a cart line by one unit.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session))]
    pub async fn decrement_cart_item(
        &self,
        session: &AuthSession,
        cart_item_id: CartItemId,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("cart/decrement/{cart_item_id}"));
        let request = Self::authorized(self.http().put(url), session);
        self.send::<serde_json::Value>(request).await?;
        Ok(())
    }

    /// Delete a cart line.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session))]
    pub async fn remove_cart_item(
        &self,
        session: &AuthSession,
        cart_item_id: CartItemId,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("cart/items/{cart_item_id}"));
        let request = Self::authorized(self.http().delete(url), session);
        self.send::<serde_json::Value>(request).await?;
        Ok(())
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session))]
    pub async fn update_cart_item(
        &self,
        session: &AuthSession,
        cart_item_id: CartItemId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let request = Self::authorized(self.http().post(self.url("cart/update")), session)
            .json(&UpdateCartItemRequest {
                cart_item_id,
                quantity,
            });
        self.send::<serde_json::Value>(request).await?;
        Ok(())
    }
}
