//! Integration tests driving the checkout orchestrator directly with a
//! scripted payment widget.

#![allow(clippy::unwrap_used)]

use std::future::Future;
use std::sync::Mutex;

use axum::http::Method;
use bettabeal_core::{OrderId, UserId};
use bettabeal_integration_tests::{CHECKOUT_ORDER, FakeUpstream};
use bettabeal_storefront::api::BackendClient;
use bettabeal_storefront::biteship::BiteshipClient;
use bettabeal_storefront::checkout::{
    CheckoutEvent, CheckoutOrchestrator, CheckoutState, PaymentOutcome, PaymentSuccessMode,
    PaymentWidget,
};
use bettabeal_storefront::config::{BiteshipConfig, DEFAULT_COURIERS, DEFAULT_ORIGIN_AREA_ID};
use bettabeal_storefront::session::AuthSession;
use bettabeal_storefront::shipping::ShippingRateResolver;
use serde_json::json;

/// Widget that reports a fixed outcome and remembers the tokens it saw.
struct ScriptedWidget {
    outcome: PaymentOutcome,
    tokens: Mutex<Vec<String>>,
}

impl ScriptedWidget {
    fn new(outcome: PaymentOutcome) -> Self {
        Self {
            outcome,
            tokens: Mutex::new(Vec::new()),
        }
    }
}

impl PaymentWidget for ScriptedWidget {
    fn pay(&self, snap_token: &str) -> impl Future<Output = PaymentOutcome> + Send {
        self.tokens.lock().unwrap().push(snap_token.to_string());
        let outcome = self.outcome;
        async move { outcome }
    }
}

fn orchestrator(upstream: &FakeUpstream, mode: PaymentSuccessMode) -> CheckoutOrchestrator {
    let client = reqwest::Client::new();
    let backend = BackendClient::with_client(client.clone(), &upstream.url());
    let biteship = BiteshipClient::with_client(
        client,
        &BiteshipConfig {
            base_url: upstream.url(),
            api_token: "biteship-test-token".to_string().into(),
            origin_area_id: DEFAULT_ORIGIN_AREA_ID.to_string(),
            couriers: DEFAULT_COURIERS.to_string(),
        },
    );
    CheckoutOrchestrator::new(backend, ShippingRateResolver::new(biteship), mode)
}

/// Run an order up to `CourierSelected` with the first quoted courier.
async fn courier_selected(checkout: &CheckoutOrchestrator, session: &AuthSession) -> CheckoutState {
    let order_id = OrderId::new(CHECKOUT_ORDER);
    let order = checkout.load_order(session, order_id).await.unwrap();
    let state = CheckoutState::Idle
        .transition(CheckoutEvent::OrderCreated(order_id))
        .unwrap();
    let state = checkout.load_rates(state, &order).await.unwrap();
    let first = state.options()[0].id.clone();
    checkout.select_courier(state, &first).unwrap()
}

#[tokio::test]
async fn test_pay_hands_snap_token_to_widget() {
    let upstream = FakeUpstream::start().await;
    let checkout = orchestrator(&upstream, PaymentSuccessMode::MarkPaid);
    let session = AuthSession::new("tok-fixture", Some(UserId::new(7)));
    let state = courier_selected(&checkout, &session).await;

    let widget = ScriptedWidget::new(PaymentOutcome::Success);
    let settlement = checkout.pay(&session, &state, &widget).await.unwrap();

    assert_eq!(widget.tokens.lock().unwrap().as_slice(), ["snap-fixture"]);
    assert_eq!(settlement.state.name(), "paid");
    assert_eq!(settlement.toasts.len(), 1);

    let updates = upstream.calls_to(&Method::PUT, "/api/orders/55");
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].body, json!({ "status": "paid" }));
}

#[tokio::test]
async fn test_closed_widget_leaves_payment_retryable() {
    let upstream = FakeUpstream::start().await;
    let checkout = orchestrator(&upstream, PaymentSuccessMode::MarkPaid);
    let session = AuthSession::new("tok-fixture", Some(UserId::new(7)));
    let state = courier_selected(&checkout, &session).await;

    let settlement = checkout
        .pay(&session, &state, &ScriptedWidget::new(PaymentOutcome::Closed))
        .await
        .unwrap();
    assert_eq!(settlement.state.name(), "closed");
    assert!(settlement.toasts.is_empty());
    assert!(settlement.state.can_start_payment());

    let settlement = checkout
        .pay(&session, &settlement.state, &ScriptedWidget::new(PaymentOutcome::Success))
        .await
        .unwrap();
    assert_eq!(settlement.state.name(), "paid");
    assert_eq!(upstream.count(&Method::PUT, "/api/orders/55"), 1);
}

#[tokio::test]
async fn test_pay_before_courier_never_opens_widget() {
    let upstream = FakeUpstream::start().await;
    let checkout = orchestrator(&upstream, PaymentSuccessMode::MarkPaid);
    let session = AuthSession::new("tok-fixture", None);
    let state = CheckoutState::Idle
        .transition(CheckoutEvent::OrderCreated(OrderId::new(CHECKOUT_ORDER)))
        .unwrap();

    let widget = ScriptedWidget::new(PaymentOutcome::Success);
    assert!(checkout.pay(&session, &state, &widget).await.is_err());
    assert!(widget.tokens.lock().unwrap().is_empty());
    assert_eq!(upstream.total_calls(), 0);
}
