//! Cart route handlers.
//!
//! `GET /cart` always refetches. Mutations patch the snapshot held in the
//! session and return the updated cart, so the client never needs a second
//! round trip. A refused add answers `502` with the unchanged cart and an
//! error toast.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bettabeal_core::{CartItemId, ProductId};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{CartError, CartSnapshot};
use crate::error::Result;
use crate::middleware::RequireSession;
use crate::session::{AuthSession, store};
use crate::state::AppState;
use crate::toast::Toast;

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub cart_item_id: CartItemId,
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub total_price: String,
    /// `None` when product detail could not be loaded.
    pub stock: Option<u32>,
    pub can_decrement: bool,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub total_items: u32,
    pub subtotal: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub toasts: Vec<Toast>,
}

impl From<&CartSnapshot> for CartView {
    fn from(snapshot: &CartSnapshot) -> Self {
        Self {
            items: snapshot
                .cart
                .items
                .iter()
                .map(|item| CartLineView {
                    cart_item_id: item.cart_item_id,
                    product_id: item.product.product_id,
                    name: item.product.name.clone(),
                    quantity: item.quantity,
                    price: item.product.price.display(),
                    total_price: item.total_price.display(),
                    stock: snapshot.stock_for(item),
                    can_decrement: item.quantity > 1,
                })
                .collect(),
            total_items: snapshot.cart.total_items,
            subtotal: snapshot.cart.subtotal.display(),
            toasts: Vec::new(),
        }
    }
}

impl CartView {
    fn with_toast(mut self, toast: Toast) -> Self {
        self.toasts.push(toast);
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityForm {
    pub quantity: u32,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// The stored snapshot, or a fresh fetch when there is none.
async fn current_snapshot(
    state: &AppState,
    session: &Session,
    auth: &AuthSession,
) -> Result<CartSnapshot> {
    if let Some(snapshot) = store::load_cart(session).await? {
        return Ok(snapshot);
    }
    Ok(state.cart().fetch(auth).await?)
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart.
#[instrument(skip(state, session, auth))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireSession(auth): RequireSession,
) -> Result<Json<CartView>> {
    let snapshot = state.cart().fetch(&auth).await?;
    store::save_cart(&session, &snapshot).await?;
    Ok(Json(CartView::from(&snapshot)))
}

/// Save a patched snapshot after an add, or turn a backend refusal into a
/// toast over the unchanged cart.
async fn added(
    session: &Session,
    snapshot: &CartSnapshot,
    result: std::result::Result<(), CartError>,
) -> Result<Response> {
    match result {
        Ok(()) => {
            store::save_cart(session, snapshot).await?;
            Ok(Json(CartView::from(snapshot)).into_response())
        }
        Err(e @ CartError::Add(_)) if !e.is_unauthorized() => {
            tracing::error!(error = ?e, "Error adding to cart");
            let view = CartView::from(snapshot).with_toast(Toast::error(e.to_string()));
            Ok((StatusCode::BAD_GATEWAY, Json(view)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Add a product to the cart.
#[instrument(skip(state, session, auth))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireSession(auth): RequireSession,
    Json(form): Json<AddToCartForm>,
) -> Result<Response> {
    let mut snapshot = current_snapshot(&state, &session, &auth).await?;
    let result = state
        .cart()
        .add_item(&auth, &mut snapshot, form.product_id, form.quantity)
        .await;
    added(&session, &snapshot, result).await
}

/// Add one unit to a line.
#[instrument(skip(state, session, auth))]
pub async fn increment(
    State(state): State<AppState>,
    session: Session,
    RequireSession(auth): RequireSession,
    Path(cart_item_id): Path<CartItemId>,
) -> Result<Response> {
    let mut snapshot = current_snapshot(&state, &session, &auth).await?;
    let result = state
        .cart()
        .increment_item(&auth, &mut snapshot, cart_item_id)
        .await;
    added(&session, &snapshot, result).await
}

/// Remove one unit from a line (never below 1).
#[instrument(skip(state, session, auth))]
pub async fn decrement(
    State(state): State<AppState>,
    session: Session,
    RequireSession(auth): RequireSession,
    Path(cart_item_id): Path<CartItemId>,
) -> Result<Json<CartView>> {
    let mut snapshot = current_snapshot(&state, &session, &auth).await?;
    if state
        .cart()
        .decrement_item(&auth, &mut snapshot, cart_item_id)
        .await?
    {
        store::save_cart(&session, &snapshot).await?;
    }
    Ok(Json(CartView::from(&snapshot)))
}

/// Set a line's quantity (ignored outside `[1, stock]`).
#[instrument(skip(state, session, auth))]
pub async fn set_quantity(
    State(state): State<AppState>,
    session: Session,
    RequireSession(auth): RequireSession,
    Path(cart_item_id): Path<CartItemId>,
    Json(form): Json<SetQuantityForm>,
) -> Result<Json<CartView>> {
    let mut snapshot = current_snapshot(&state, &session, &auth).await?;
    if state
        .cart()
        .set_quantity(&auth, &mut snapshot, cart_item_id, form.quantity)
        .await?
    {
        store::save_cart(&session, &snapshot).await?;
    }
    Ok(Json(CartView::from(&snapshot)))
}

/// Delete a line.
#[instrument(skip(state, session, auth))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    RequireSession(auth): RequireSession,
    Path(cart_item_id): Path<CartItemId>,
) -> Result<Json<CartView>> {
    let mut snapshot = current_snapshot(&state, &session, &auth).await?;
    let removed = state
        .cart()
        .remove_item(&auth, &mut snapshot, cart_item_id)
        .await?;
    store::save_cart(&session, &snapshot).await?;

    let toast = Toast::success(format!("'{}' removed from cart.", removed.product.name));
    Ok(Json(CartView::from(&snapshot).with_toast(toast)))
}
