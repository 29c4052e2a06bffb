use bettabeal_core::{AddressId, OrderId, OrderStatus, Rupiah};
use serde::Serialize;
use tracing::instrument;

use super::payment::{PaymentOutcome, PaymentSuccessMode, PaymentWidget};
use super::state::{CheckoutEvent, CheckoutState};
use super::CheckoutError;
use crate::api::{BackendClient, Order};
use crate::session::AuthSession;
use crate::shipping::ShippingRateResolver;
use crate::toast::Toast;

/// Where the visitor lands after a successful payment in redirect mode.
pub const SUCCESS_PATH: &str = "/cart/success";

/// Result of settling a payment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub state: CheckoutState,
    pub toasts: Vec<Toast>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

/// Amounts shown on the order summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutTotals {
    pub items: Rupiah,
    pub shipping: Rupiah,
    pub subtotal: Rupiah,
}

impl CheckoutTotals {
    /// Items total plus the selected courier's price (zero when none).
    #[must_use]
    pub fn compute(order: &Order, state: &CheckoutState) -> Self {
        let items = order.total_amount;
        let shipping = state.selected().map_or(Rupiah::ZERO, |option| option.price);
        Self {
            items,
            shipping,
            subtotal: items + shipping,
        }
    }
}

/// Drives a checkout from address selection to settled payment.
#[derive(Clone)]
pub struct CheckoutOrchestrator {
    backend: BackendClient,
    rates: ShippingRateResolver,
    on_success: PaymentSuccessMode,
}

impl CheckoutOrchestrator {
    #[must_use]
    pub const fn new(
        backend: BackendClient,
        rates: ShippingRateResolver,
        on_success: PaymentSuccessMode,
    ) -> Self {
        Self {
            backend,
            rates,
            on_success,
        }
    }

    /// Create an order from the cart, shipped to `address_id`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NoAddressSelected` without calling the
    /// backend when no address was chosen, or the backend failure.
    #[instrument(skip(self, session))]
    pub async fn create_order(
        &self,
        session: &AuthSession,
        address_id: Option<AddressId>,
    ) -> Result<CheckoutState, CheckoutError> {
        let address_id = address_id.ok_or(CheckoutError::NoAddressSelected)?;
        let order_id = self.backend.create_order(session, address_id).await?;
        tracing::info!(order_id = %order_id, "Order created");
        CheckoutState::Idle.transition(CheckoutEvent::OrderCreated(order_id))
    }

    /// Load an order for display.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn load_order(
        &self,
        session: &AuthSession,
        order_id: OrderId,
    ) -> Result<Order, CheckoutError> {
        Ok(self.backend.get_order(session, order_id).await?)
    }

    /// Quote couriers for the order.
    ///
    /// A state that is not waiting for rates is returned unchanged without
    /// calling the courier API. A failed quote is recorded in the state
    /// rather than returned as an error; it is asked for again on the next
    /// call, never within this one.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidTransition` when no order exists yet.
    #[instrument(skip(self, state, order), fields(order_id = %order.order_id))]
    pub async fn load_rates(
        &self,
        state: CheckoutState,
        order: &Order,
    ) -> Result<CheckoutState, CheckoutError> {
        if matches!(state, CheckoutState::Idle) {
            return Err(CheckoutError::InvalidTransition {
                from: state.name(),
                event: "load shipping rates",
            });
        }
        if !state.awaits_rates() {
            return Ok(state);
        }

        let event = match order.destination_area_id() {
            None => CheckoutEvent::RatesFailed(
                "Error: shipping address has no delivery area".to_string(),
            ),
            Some(destination) => match self.rates.resolve_rates(destination, &order.items).await {
                Ok(options) => CheckoutEvent::RatesLoaded(options),
                Err(e) => {
                    tracing::warn!(error = %e, "Courier rate lookup failed");
                    CheckoutEvent::RatesFailed(e.to_string())
                }
            },
        };
        state.transition(event)
    }

    /// Pick a courier. Purely local.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` when no quote is on offer or the id is unknown.
    pub fn select_courier(
        &self,
        state: CheckoutState,
        courier_id: &str,
    ) -> Result<CheckoutState, CheckoutError> {
        state.transition(CheckoutEvent::CourierSelected(courier_id.to_string()))
    }

    /// Refetch the order for a current snap token and enter
    /// `PaymentInProgress`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidTransition` without calling the
    /// backend when no courier is selected, `CheckoutError::MissingSnapToken`
    /// when the order has none yet, or the backend failure. The state is
    /// left as it was in every error case.
    #[instrument(skip(self, session, state))]
    pub async fn prepare_payment(
        &self,
        session: &AuthSession,
        state: &CheckoutState,
    ) -> Result<(CheckoutState, String), CheckoutError> {
        let (Some(order_id), true) = (state.order_id(), state.can_start_payment()) else {
            return Err(CheckoutError::InvalidTransition {
                from: state.name(),
                event: "start payment",
            });
        };

        let order = self.backend.get_order(session, order_id).await?;
        let snap_token = order
            .snap_token
            .filter(|token| !token.is_empty())
            .ok_or(CheckoutError::MissingSnapToken)?;

        let next = state.clone().transition(CheckoutEvent::PaymentStarted)?;
        Ok((next, snap_token))
    }

    /// Reconcile the widget's report.
    ///
    /// Success produces exactly one success toast. In mark-paid mode the
    /// order is then updated on the backend; if that fails the checkout is
    /// still `Paid` and an extra error toast is added.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidTransition` unless a payment is in
    /// progress, so a repeated report is rejected.
    #[instrument(skip(self, session, state))]
    pub async fn settle_payment(
        &self,
        session: &AuthSession,
        state: CheckoutState,
        outcome: PaymentOutcome,
    ) -> Result<Settlement, CheckoutError> {
        let next = state.transition(CheckoutEvent::PaymentFinished(outcome))?;
        let mut toasts = Vec::new();
        let mut redirect = None;

        match outcome {
            PaymentOutcome::Success => {
                toasts.push(Toast::success("Payment successful!"));
                match self.on_success {
                    PaymentSuccessMode::MarkPaid => {
                        if let Some(order_id) = next.order_id()
                            && let Err(e) = self
                                .backend
                                .update_order_status(session, order_id, OrderStatus::Paid)
                                .await
                        {
                            tracing::error!(order_id = %order_id, error = %e, "Error updating order status");
                            toasts.push(Toast::error("Failed to update order status"));
                        }
                    }
                    PaymentSuccessMode::Redirect => {
                        redirect = next
                            .order_id()
                            .map(|order_id| format!("{SUCCESS_PATH}?order_id={order_id}"));
                    }
                }
            }
            PaymentOutcome::Pending => toasts.push(Toast::info("Payment pending...")),
            PaymentOutcome::Error => toasts.push(Toast::error("Payment failed!")),
            PaymentOutcome::Closed => tracing::debug!("Payment popup closed"),
        }

        tracing::info!(outcome = outcome.as_str(), state = next.name(), "Payment settled");
        Ok(Settlement {
            state: next,
            toasts,
            redirect,
        })
    }

    /// Run a whole payment attempt through an in-process widget.
    ///
    /// # Errors
    ///
    /// Returns the error from preparing or settling the payment.
    pub async fn pay<W: PaymentWidget + Sync>(
        &self,
        session: &AuthSession,
        state: &CheckoutState,
        widget: &W,
    ) -> Result<Settlement, CheckoutError> {
        let (in_progress, snap_token) = self.prepare_payment(session, state).await?;
        let outcome = widget.pay(&snap_token).await;
        self.settle_payment(session, in_progress, outcome).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shipping::CourierOption;

    #[test]
    fn test_totals_add_selected_courier() {
        let order: Order =
            serde_json::from_str(r#"{"order_id":5,"total_amount":"20000.00","items":[]}"#).unwrap();
        let option = CourierOption {
            id: "JNE-REG-0".to_string(),
            courier_name: "JNE".to_string(),
            courier_service_name: "Reguler".to_string(),
            courier_service_code: "REG".to_string(),
            duration: "1 - 2 days".to_string(),
            price: Rupiah::from_whole(9000),
        };
        let state = CheckoutState::Idle
            .transition(CheckoutEvent::OrderCreated(OrderId::new(5)))
            .unwrap()
            .transition(CheckoutEvent::RatesLoaded(vec![option]))
            .unwrap();

        let before = CheckoutTotals::compute(&order, &state);
        assert_eq!(before.shipping, Rupiah::ZERO);
        assert_eq!(before.subtotal.display(), "Rp20.000");

        let state = state
            .transition(CheckoutEvent::CourierSelected("JNE-REG-0".to_string()))
            .unwrap();
        let totals = CheckoutTotals::compute(&order, &state);
        assert_eq!(totals.items.display(), "Rp20.000");
        assert_eq!(totals.shipping.display(), "Rp9.000");
        assert_eq!(totals.subtotal.display(), "Rp29.000");
    }
}
