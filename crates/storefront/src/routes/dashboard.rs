//! Seller order management.
//!
//! Every handler re-checks the token with the backend before acting.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use bettabeal_core::{OrderId, ShippingStatus};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::orders::OrderSummaryView;
use crate::api::Pagination;
use crate::error::{AppError, Result};
use crate::middleware::RequireVerifiedSession;
use crate::orders::BulkShippingReport;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct SellerOrdersView {
    pub orders: Vec<OrderSummaryView>,
    pub pagination: Option<Pagination>,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct SellerOrdersQuery {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub status: Option<String>,
}

const fn first_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct ShippingStatusForm {
    pub order_ids: Vec<OrderId>,
    pub shipping_status: String,
}

/// List the seller's orders, optionally filtered by status.
#[instrument(skip(state, auth))]
pub async fn orders(
    State(state): State<AppState>,
    RequireVerifiedSession(auth): RequireVerifiedSession,
    Query(query): Query<SellerOrdersQuery>,
) -> Result<Json<SellerOrdersView>> {
    let list = state
        .orders()
        .seller_orders(&auth, query.page, query.status.as_deref())
        .await?;
    Ok(Json(SellerOrdersView {
        orders: list.orders.iter().map(OrderSummaryView::from).collect(),
        pagination: list.pagination,
        status: query.status.unwrap_or_else(|| "all".to_string()),
    }))
}

/// Move the selected orders to a new shipping status.
///
/// Answers 502 with the partial report when an update fails midway.
#[instrument(skip(state, auth))]
pub async fn update_shipping_status(
    State(state): State<AppState>,
    RequireVerifiedSession(auth): RequireVerifiedSession,
    Json(form): Json<ShippingStatusForm>,
) -> Result<(StatusCode, Json<BulkShippingReport>)> {
    let target: ShippingStatus = form.shipping_status.parse().map_err(AppError::BadRequest)?;
    if form.order_ids.is_empty() {
        return Err(AppError::BadRequest("no orders selected".to_string()));
    }

    let report = state
        .orders()
        .bulk_update_shipping(&auth, &form.order_ids, target)
        .await?;
    let status = if report.error.is_some() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };
    Ok((status, Json(report)))
}
