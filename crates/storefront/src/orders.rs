//! Order listings and seller fulfilment actions.

use bettabeal_core::{OrderId, OrderStatus, ShippingStatus};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::api::{ApiError, BackendClient, Order, OrderList};
use crate::session::AuthSession;

/// Orders per page in the customer's order history.
pub const ORDERS_PER_PAGE: usize = 11;

/// One page of a locally paginated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub page: usize,
    pub total_pages: usize,
}

/// Slice `items` into pages of `per_page`.
///
/// Page numbers below 1 are treated as 1; pages past the end are empty.
#[must_use]
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total_pages = items.len().div_ceil(per_page);
    let items = items
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();
    Page {
        items,
        page,
        total_pages,
    }
}

#[derive(Debug, Error)]
pub enum OrdersError {
    #[error("Cannot mark as shipping because one or more selected orders are not paid yet.")]
    NotPaid(Vec<OrderId>),

    #[error(
        "Cannot mark as delivered because one or more selected orders are not marked as shipping yet."
    )]
    NotShipped(Vec<OrderId>),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl OrdersError {
    /// Whether the backend refused the session token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_unauthorized())
    }
}

/// Check that every order may move to `target`.
///
/// Shipping requires a settled payment (`success`); delivery requires the
/// parcel to be shipped.
///
/// # Errors
///
/// Returns the ids of the offending orders.
pub fn validate_shipping_transition(orders: &[Order], target: ShippingStatus) -> Result<(), OrdersError> {
    let offending = |allowed: fn(&Order) -> bool| -> Vec<OrderId> {
        orders
            .iter()
            .filter(|order| !allowed(order))
            .map(|order| order.order_id)
            .collect()
    };

    match target {
        ShippingStatus::Shipped => {
            let invalid = offending(|order| order.status == OrderStatus::Success);
            if invalid.is_empty() { Ok(()) } else { Err(OrdersError::NotPaid(invalid)) }
        }
        ShippingStatus::Delivered => {
            let invalid = offending(|order| order.shipping_status == Some(ShippingStatus::Shipped));
            if invalid.is_empty() { Ok(()) } else { Err(OrdersError::NotShipped(invalid)) }
        }
        ShippingStatus::Processing => Ok(()),
    }
}

/// Result of a bulk shipping update.
///
/// Updates run in order and stop at the first failure; `messages` has one
/// line per order updated before that point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkShippingReport {
    pub updated: Vec<OrderId>,
    pub messages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn success_line(order_id: OrderId, target: ShippingStatus) -> String {
    let verb = match target {
        ShippingStatus::Shipped => "shipping",
        other => other.as_str(),
    };
    format!("Successfully marked order #{order_id} as {verb}.")
}

/// Order listings for customers and sellers.
#[derive(Clone)]
pub struct OrderService {
    backend: BackendClient,
}

impl OrderService {
    #[must_use]
    pub const fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// The customer's order history, paginated locally.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    #[instrument(skip(self, session))]
    pub async fn history(&self, session: &AuthSession, page: usize) -> Result<Page<Order>, OrdersError> {
        let orders = self.backend.list_orders(session).await?;
        Ok(paginate(orders, page, ORDERS_PER_PAGE))
    }

    /// One server-side page of the seller's orders.
    ///
    /// A status of `all` (or none) lists every status.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    #[instrument(skip(self, session))]
    pub async fn seller_orders(
        &self,
        session: &AuthSession,
        page: u32,
        status: Option<&str>,
    ) -> Result<OrderList, OrdersError> {
        let status = status.map(str::trim).filter(|s| !s.is_empty() && *s != "all");
        Ok(self
            .backend
            .list_seller_orders(session, page.max(1), status)
            .await?)
    }

    /// Move several orders to `target`, one request at a time.
    ///
    /// Every order is loaded and validated before the first update is sent;
    /// if any would be an illegal transition nothing is updated.
    ///
    /// # Errors
    ///
    /// Returns `OrdersError::NotPaid`/`NotShipped` from validation, or the
    /// failure to load an order. Failures during the update pass are
    /// reported in the returned report instead.
    #[instrument(skip(self, session))]
    pub async fn bulk_update_shipping(
        &self,
        session: &AuthSession,
        order_ids: &[OrderId],
        target: ShippingStatus,
    ) -> Result<BulkShippingReport, OrdersError> {
        let mut orders = Vec::with_capacity(order_ids.len());
        for &order_id in order_ids {
            orders.push(self.backend.get_order(session, order_id).await?);
        }
        validate_shipping_transition(&orders, target)?;

        let mut report = BulkShippingReport {
            updated: Vec::new(),
            messages: Vec::new(),
            error: None,
        };
        for &order_id in order_ids {
            match self
                .backend
                .update_shipping_status(session, order_id, target)
                .await
            {
                Ok(()) => {
                    report.updated.push(order_id);
                    report.messages.push(success_line(order_id, target));
                }
                Err(e) => {
                    tracing::error!(order_id = %order_id, error = %e, "Error updating order");
                    report.error = Some(e.to_string());
                    break;
                }
            }
        }
        Ok(report)
    }
}
