use std::collections::BTreeMap;

use bettabeal_core::{CartItemId, ProductId, Rupiah};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use super::reducer::{self, CartAction};
use crate::api::{ApiError, BackendClient, CartData, CartItem, Product};
use crate::session::AuthSession;

/// Cart failures, rendered with the generic user-facing message.
///
/// The upstream cause is kept as the error source for logging.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Failed to fetch cart")]
    Fetch(#[source] ApiError),

    #[error("Failed to add product to cart")]
    Add(#[source] ApiError),

    #[error("Failed to update cart")]
    Update(#[source] ApiError),

    #[error("Failed to remove item from cart")]
    Remove(#[source] ApiError),

    #[error("Cart item {0} not found")]
    UnknownItem(CartItemId),
}

impl CartError {
    /// Whether the backend refused the session token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        match self {
            Self::Fetch(e) | Self::Add(e) | Self::Update(e) | Self::Remove(e) => {
                e.is_unauthorized()
            }
            Self::UnknownItem(_) => false,
        }
    }
}

/// The cart plus the product detail needed to bound quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub cart: CartData,
    #[serde(default)]
    pub products: BTreeMap<ProductId, Product>,
}

impl CartSnapshot {
    /// Stock available for a line's product, if its detail was loaded.
    #[must_use]
    pub fn stock_for(&self, item: &CartItem) -> Option<u32> {
        self.products
            .get(&item.product.product_id)
            .map(|product| product.stock_quantity)
    }

    #[must_use]
    pub fn item(&self, cart_item_id: CartItemId) -> Option<&CartItem> {
        self.cart
            .items
            .iter()
            .find(|item| item.cart_item_id == cart_item_id)
    }

    fn unit_price(&self, product_id: ProductId) -> Option<Rupiah> {
        self.products
            .get(&product_id)
            .map(|product| product.price)
            .or_else(|| {
                self.cart
                    .items
                    .iter()
                    .find(|item| item.product.product_id == product_id)
                    .map(|item| item.product.price)
            })
    }
}

/// Cart operations against the backend.
#[derive(Clone)]
pub struct CartClient {
    backend: BackendClient,
}

impl CartClient {
    #[must_use]
    pub const fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// Fetch the cart and the detail of every product in it.
    ///
    /// A product whose detail cannot be loaded is skipped; its line stays in
    /// the cart but cannot have its quantity set directly.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Fetch` if the cart itself cannot be loaded.
    #[instrument(skip(self, session))]
    pub async fn fetch(&self, session: &AuthSession) -> Result<CartSnapshot, CartError> {
        let cart = self
            .backend
            .get_cart(session)
            .await
            .map_err(CartError::Fetch)?;

        let mut products = BTreeMap::new();
        for item in &cart.items {
            let product_id = item.product.product_id;
            if products.contains_key(&product_id) {
                continue;
            }
            match self.backend.get_product(session, product_id).await {
                Ok(product) => {
                    products.insert(product_id, product);
                }
                Err(e) => {
                    tracing::warn!(product_id = %product_id, error = %e, "Failed to fetch product details");
                }
            }
        }

        Ok(CartSnapshot { cart, products })
    }

    /// Add `quantity` units of a product and patch the snapshot.
    ///
    /// Zero, or a quantity that would overflow the cart's counters, is
    /// ignored without calling the backend.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Add` if the backend rejects the addition.
    #[instrument(skip(self, session, snapshot))]
    pub async fn add_item(
        &self,
        session: &AuthSession,
        snapshot: &mut CartSnapshot,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Ok(());
        }

        let unit_price = match snapshot.unit_price(product_id) {
            Some(price) => price,
            None => {
                let product = self
                    .backend
                    .get_product(session, product_id)
                    .await
                    .map_err(CartError::Add)?;
                let price = product.price;
                snapshot.products.insert(product_id, product);
                price
            }
        };

        let action = CartAction::ItemAdded {
            product_id,
            quantity,
            unit_price,
        };
        if !action.is_applicable(&snapshot.cart) {
            tracing::debug!(quantity, "Ignoring add that would overflow the cart");
            return Ok(());
        }

        self.backend
            .add_to_cart(session, product_id, quantity)
            .await
            .map_err(CartError::Add)?;

        reducer::apply(&mut snapshot.cart, &action);
        Ok(())
    }

    /// Add one unit of the line's product.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UnknownItem` for a line not in the snapshot, or
    /// `CartError::Add` if the backend rejects the addition.
    pub async fn increment_item(
        &self,
        session: &AuthSession,
        snapshot: &mut CartSnapshot,
        cart_item_id: CartItemId,
    ) -> Result<(), CartError> {
        let product_id = snapshot
            .item(cart_item_id)
            .map(|item| item.product.product_id)
            .ok_or(CartError::UnknownItem(cart_item_id))?;
        self.add_item(session, snapshot, product_id, 1).await
    }

    /// Remove one unit from a line. Lines at quantity 1 are left alone
    /// without calling the backend; returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Update` if the backend rejects the change.
    #[instrument(skip(self, session, snapshot))]
    pub async fn decrement_item(
        &self,
        session: &AuthSession,
        snapshot: &mut CartSnapshot,
        cart_item_id: CartItemId,
    ) -> Result<bool, CartError> {
        let action = CartAction::ItemDecremented { cart_item_id };
        if !action.is_applicable(&snapshot.cart) {
            return Ok(false);
        }

        self.backend
            .decrement_cart_item(session, cart_item_id)
            .await
            .map_err(CartError::Update)?;

        Ok(reducer::apply(&mut snapshot.cart, &action))
    }

    /// Delete a line. Returns the removed line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UnknownItem` for a line not in the snapshot, or
    /// `CartError::Remove` if the backend rejects the deletion.
    #[instrument(skip(self, session, snapshot))]
    pub async fn remove_item(
        &self,
        session: &AuthSession,
        snapshot: &mut CartSnapshot,
        cart_item_id: CartItemId,
    ) -> Result<CartItem, CartError> {
        let removed = snapshot
            .item(cart_item_id)
            .cloned()
            .ok_or(CartError::UnknownItem(cart_item_id))?;

        self.backend
            .remove_cart_item(session, cart_item_id)
            .await
            .map_err(CartError::Remove)?;

        reducer::apply(&mut snapshot.cart, &CartAction::ItemRemoved { cart_item_id });
        Ok(removed)
    }

    /// Set a line's quantity. Values outside `[1, stock]` are ignored
    /// without calling the backend; returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Update` if the backend rejects the change.
    #[instrument(skip(self, session, snapshot))]
    pub async fn set_quantity(
        &self,
        session: &AuthSession,
        snapshot: &mut CartSnapshot,
        cart_item_id: CartItemId,
        quantity: u32,
    ) -> Result<bool, CartError> {
        let Some(stock) = snapshot.item(cart_item_id).and_then(|item| snapshot.stock_for(item))
        else {
            return Ok(false);
        };

        let action = CartAction::QuantitySet {
            cart_item_id,
            quantity,
            stock,
        };
        if !action.is_applicable(&snapshot.cart) {
            return Ok(false);
        }

        self.backend
            .update_cart_item(session, cart_item_id, quantity)
            .await
            .map_err(CartError::Update)?;

        Ok(reducer::apply(&mut snapshot.cart, &action))
    }
}
