//! Checkout route handlers.
//!
//! ```text
//! POST /checkout                       - create the order, redirect to it
//! GET  /checkout/{order_id}            - order summary, quotes couriers until one succeeds
//! POST /checkout/{order_id}/courier    - pick a courier
//! POST /checkout/{order_id}/payment    - fresh snap token for the widget
//! POST /checkout/{order_id}/payment/result - widget outcome
//! ```
//!
//! The widget itself runs client-side between the last two calls.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use bettabeal_core::{AddressId, OrderId};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{Address, Order};
use crate::checkout::{
    CheckoutError, CheckoutEvent, CheckoutState, CheckoutTotals, PaymentOutcome, Settlement,
};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireSession;
use crate::session::store;
use crate::shipping::CourierOption;
use crate::state::AppState;
use crate::toast::Toast;

// =============================================================================
// Views
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct OrderLineView {
    pub product_name: String,
    pub quantity: u32,
    pub price: String,
    pub subtotal: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourierOptionView {
    pub id: String,
    pub courier_name: String,
    pub courier_service_name: String,
    pub duration: String,
    pub price: String,
}

impl From<&CourierOption> for CourierOptionView {
    fn from(option: &CourierOption) -> Self {
        Self {
            id: option.id.clone(),
            courier_name: option.courier_name.clone(),
            courier_service_name: option.courier_service_name.clone(),
            duration: option.duration_label(),
            price: option.price.display_with_cents(),
        }
    }
}

/// Order summary page data.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutView {
    pub order_id: OrderId,
    pub state: &'static str,
    pub items: Vec<OrderLineView>,
    pub address: Option<Address>,
    pub courier_options: Vec<CourierOptionView>,
    pub selected_courier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rates_error: Option<String>,
    pub items_total: String,
    pub shipping_fee: String,
    pub subtotal: String,
    pub can_pay: bool,
}

impl CheckoutView {
    fn new(order: Order, state: &CheckoutState) -> Self {
        let totals = CheckoutTotals::compute(&order, state);
        Self {
            order_id: order.order_id,
            state: state.name(),
            items: order
                .items
                .iter()
                .map(|item| OrderLineView {
                    product_name: item.product.product_name.clone(),
                    quantity: item.quantity,
                    price: item.price.display(),
                    subtotal: item.subtotal.display(),
                })
                .collect(),
            address: order.address,
            courier_options: state.options().iter().map(CourierOptionView::from).collect(),
            selected_courier: state.selected().map(|option| option.id.clone()),
            rates_error: state.rates_error().map(String::from),
            items_total: totals.items.display(),
            shipping_fee: totals.shipping.display(),
            subtotal: totals.subtotal.display(),
            can_pay: state.can_start_payment(),
        }
    }
}

/// Data the client needs to open the payment widget.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentView {
    pub state: &'static str,
    pub snap_token: String,
}

// =============================================================================
// Forms
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderForm {
    #[serde(default)]
    pub address_id: Option<AddressId>,
}

#[derive(Debug, Deserialize)]
pub struct SelectCourierForm {
    pub courier_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentResultForm {
    pub outcome: PaymentOutcome,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// The stored checkout, or `Idle` when the session has none for the order.
async fn stored_state(session: &Session, order_id: OrderId) -> Result<CheckoutState> {
    Ok(store::load_checkout(session, order_id)
        .await?
        .unwrap_or(CheckoutState::Idle))
}

// =============================================================================
// Handlers
// =============================================================================

/// Create an order for the chosen address.
#[instrument(skip(state, session, auth))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireSession(auth): RequireSession,
    Json(form): Json<CreateOrderForm>,
) -> Result<Redirect> {
    let checkout = state.checkout().create_order(&auth, form.address_id).await?;
    store::save_checkout(&session, &checkout).await?;

    let order_id = checkout
        .order_id()
        .ok_or_else(|| AppError::Internal("created checkout has no order".to_string()))?;
    add_breadcrumb("checkout", "Order created", &[("order_id", &order_id.to_string())]);
    Ok(Redirect::to(&format!("/checkout/{order_id}")))
}

/// Show the order summary. Quotes couriers while the checkout has none.
#[instrument(skip(state, session, auth))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireSession(auth): RequireSession,
    Path(order_id): Path<OrderId>,
) -> Result<Json<CheckoutView>> {
    let order = state.checkout().load_order(&auth, order_id).await?;

    let mut checkout = stored_state(&session, order_id).await?;
    if matches!(checkout, CheckoutState::Idle) {
        // Session lost (restart, new device): the order itself is proof
        // enough that it was created.
        checkout = checkout.transition(CheckoutEvent::OrderCreated(order_id))?;
    }
    let checkout = state.checkout().load_rates(checkout, &order).await?;
    store::save_checkout(&session, &checkout).await?;

    Ok(Json(CheckoutView::new(order, &checkout)))
}

/// Pick a courier.
#[instrument(skip(state, session, auth, form))]
pub async fn select_courier(
    State(state): State<AppState>,
    session: Session,
    RequireSession(auth): RequireSession,
    Path(order_id): Path<OrderId>,
    Json(form): Json<SelectCourierForm>,
) -> Result<Json<CheckoutView>> {
    let checkout = stored_state(&session, order_id).await?;
    let checkout = state.checkout().select_courier(checkout, &form.courier_id)?;
    store::save_checkout(&session, &checkout).await?;

    let order = state.checkout().load_order(&auth, order_id).await?;
    Ok(Json(CheckoutView::new(order, &checkout)))
}

/// Fetch a current snap token and mark the payment as started.
///
/// Upstream failures leave the checkout where it was and answer with a
/// toast so the visitor can retry.
#[instrument(skip(state, session, auth))]
pub async fn start_payment(
    State(state): State<AppState>,
    session: Session,
    RequireSession(auth): RequireSession,
    Path(order_id): Path<OrderId>,
) -> Result<Response> {
    let checkout = stored_state(&session, order_id).await?;

    match state.checkout().prepare_payment(&auth, &checkout).await {
        Ok((next, snap_token)) => {
            store::save_checkout(&session, &next).await?;
            add_breadcrumb("checkout", "Payment started", &[("order_id", &order_id.to_string())]);
            Ok(Json(PaymentView {
                state: next.name(),
                snap_token,
            })
            .into_response())
        }
        Err(e @ (CheckoutError::MissingSnapToken | CheckoutError::Api(_))) if !e.is_unauthorized() => {
            tracing::error!(order_id = %order_id, error = %e, "Failed to proceed to payment");
            let toast = Toast::error("Failed to proceed to payment");
            Ok((
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": e.to_string(), "toasts": [toast] })),
            )
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Record the widget's outcome.
#[instrument(skip(state, session, auth, form))]
pub async fn payment_result(
    State(state): State<AppState>,
    session: Session,
    RequireSession(auth): RequireSession,
    Path(order_id): Path<OrderId>,
    Json(form): Json<PaymentResultForm>,
) -> Result<Json<Settlement>> {
    let checkout = stored_state(&session, order_id).await?;
    let settlement = state
        .checkout()
        .settle_payment(&auth, checkout, form.outcome)
        .await?;
    store::save_checkout(&session, &settlement.state).await?;

    add_breadcrumb(
        "checkout",
        "Payment settled",
        &[("order_id", &order_id.to_string()), ("outcome", form.outcome.as_str())],
    );
    Ok(Json(settlement))
}
