//! Wishlist route handlers.
//!
//! A listing failure shows an empty wishlist; a failed removal answers 502
//! with an error toast.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bettabeal_core::{ProductId, WishlistId};
use serde::Serialize;
use tracing::instrument;

use super::orders::PageQuery;
use crate::api::WishlistItem;
use crate::error::Result;
use crate::middleware::RequireSession;
use crate::state::AppState;
use crate::toast::Toast;

#[derive(Debug, Clone, Serialize)]
pub struct WishlistEntryView {
    pub wishlist_id: WishlistId,
    pub product_id: ProductId,
    pub product_name: String,
    pub price: String,
    pub image_url: Option<String>,
    pub category_name: Option<String>,
    pub average_rating: Option<f64>,
}

impl From<WishlistItem> for WishlistEntryView {
    fn from(item: WishlistItem) -> Self {
        let product = item.product;
        Self {
            wishlist_id: item.wishlist_id,
            product_id: product.product_id,
            price: product.price.display(),
            product_name: product.product_name,
            image_url: product.main_image.map(|image| image.image_url),
            category_name: product.category.map(|category| category.category_name),
            average_rating: product.average_rating,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WishlistView {
    pub items: Vec<WishlistEntryView>,
    pub page: usize,
    pub total_pages: usize,
}

/// Outcome of a removal. The client drops the entry itself on success.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistRemovalView {
    pub removed: Option<WishlistId>,
    pub toasts: Vec<Toast>,
}

/// List saved products.
#[instrument(skip(state, auth))]
pub async fn index(
    State(state): State<AppState>,
    RequireSession(auth): RequireSession,
    Query(query): Query<PageQuery>,
) -> Result<Json<WishlistView>> {
    let page = state.wishlist().page(&auth, query.page).await?;
    Ok(Json(WishlistView {
        items: page.items.into_iter().map(WishlistEntryView::from).collect(),
        page: page.page,
        total_pages: page.total_pages,
    }))
}

/// Remove a saved product.
#[instrument(skip(state, auth))]
pub async fn remove(
    State(state): State<AppState>,
    RequireSession(auth): RequireSession,
    Path(wishlist_id): Path<WishlistId>,
) -> Result<Response> {
    match state.wishlist().remove(&auth, wishlist_id).await {
        Ok(()) => Ok(Json(WishlistRemovalView {
            removed: Some(wishlist_id),
            toasts: vec![Toast::success("Product removed from wishlist.")],
        })
        .into_response()),
        Err(e) if e.is_unauthorized() => Err(e.into()),
        Err(e) => {
            tracing::error!(wishlist_id = %wishlist_id, error = ?e, "Error removing product from wishlist");
            Ok((
                StatusCode::BAD_GATEWAY,
                Json(WishlistRemovalView {
                    removed: None,
                    toasts: vec![Toast::error(e.to_string())],
                }),
            )
                .into_response())
        }
    }
}
