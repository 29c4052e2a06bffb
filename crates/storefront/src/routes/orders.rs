//! Customer order history.

use axum::{
    Json,
    extract::{Query, State},
};
use bettabeal_core::{OrderId, OrderStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::Order;
use crate::error::Result;
use crate::middleware::RequireSession;
use crate::state::AppState;

/// One row of an order listing.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummaryView {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub shipping_status: &'static str,
    pub total_amount: String,
    pub item_count: usize,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Order> for OrderSummaryView {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id,
            status: order.status,
            shipping_status: order.shipping_label(),
            total_amount: order.total_amount.display_with_cents(),
            item_count: order.items.len(),
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderHistoryView {
    pub orders: Vec<OrderSummaryView>,
    pub page: usize,
    pub total_pages: usize,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: usize,
}

const fn first_page() -> usize {
    1
}

/// List the customer's orders.
#[instrument(skip(state, auth))]
pub async fn index(
    State(state): State<AppState>,
    RequireSession(auth): RequireSession,
    Query(query): Query<PageQuery>,
) -> Result<Json<OrderHistoryView>> {
    let page = state.orders().history(&auth, query.page).await?;
    Ok(Json(OrderHistoryView {
        orders: page.items.iter().map(OrderSummaryView::from).collect(),
        page: page.page,
        total_pages: page.total_pages,
    }))
}
