//! Checkout state machine.
//!
//! ```text
//! Idle -> OrderCreated -> RatesLoaded -> CourierSelected -> PaymentInProgress
//!                                                             |
//!                                  +--------+--------+--------+
//!                                  v        v        v        v
//!                                 Paid   Pending   Failed   Closed
//! ```
//!
//! `Pending`, `Failed` and `Closed` keep the quote so the visitor can pick
//! a courier again or retry payment. A `PaymentInProgress` whose widget
//! never reported back may start payment again with a fresh snap token.
//! `Paid` is terminal. A failed rate quote leaves the checkout in
//! `OrderCreated` with the error attached, which blocks payment since there
//! is nothing to select, until a later quote succeeds.

use bettabeal_core::OrderId;
use serde::{Deserialize, Serialize};

use super::CheckoutError;
use super::payment::PaymentOutcome;
use crate::shipping::CourierOption;

/// Courier options for an order and the one the visitor picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub options: Vec<CourierOption>,
    pub selected: CourierOption,
}

impl Quote {
    fn select(options: Vec<CourierOption>, courier_id: &str) -> Result<Self, CheckoutError> {
        let selected = options
            .iter()
            .find(|option| option.id == courier_id)
            .cloned()
            .ok_or_else(|| CheckoutError::UnknownCourier(courier_id.to_string()))?;
        Ok(Self { options, selected })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CheckoutState {
    Idle,
    OrderCreated {
        order_id: OrderId,
        rates_error: Option<String>,
    },
    RatesLoaded {
        order_id: OrderId,
        options: Vec<CourierOption>,
    },
    CourierSelected {
        order_id: OrderId,
        quote: Quote,
    },
    PaymentInProgress {
        order_id: OrderId,
        quote: Quote,
    },
    Paid {
        order_id: OrderId,
        quote: Quote,
    },
    Pending {
        order_id: OrderId,
        quote: Quote,
    },
    Failed {
        order_id: OrderId,
        quote: Quote,
    },
    Closed {
        order_id: OrderId,
        quote: Quote,
    },
}

/// Something that happened during checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutEvent {
    OrderCreated(OrderId),
    RatesLoaded(Vec<CourierOption>),
    RatesFailed(String),
    CourierSelected(String),
    PaymentStarted,
    PaymentFinished(PaymentOutcome),
}

impl CheckoutEvent {
    const fn name(&self) -> &'static str {
        match self {
            Self::OrderCreated(_) => "create an order",
            Self::RatesLoaded(_) | Self::RatesFailed(_) => "load shipping rates",
            Self::CourierSelected(_) => "select a courier",
            Self::PaymentStarted => "start payment",
            Self::PaymentFinished(_) => "settle payment",
        }
    }
}

impl CheckoutState {
    /// Stable name of the state, as serialized.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::OrderCreated { .. } => "order_created",
            Self::RatesLoaded { .. } => "rates_loaded",
            Self::CourierSelected { .. } => "courier_selected",
            Self::PaymentInProgress { .. } => "payment_in_progress",
            Self::Paid { .. } => "paid",
            Self::Pending { .. } => "pending",
            Self::Failed { .. } => "failed",
            Self::Closed { .. } => "closed",
        }
    }

    #[must_use]
    pub const fn order_id(&self) -> Option<OrderId> {
        match self {
            Self::Idle => None,
            Self::OrderCreated { order_id, .. }
            | Self::RatesLoaded { order_id, .. }
            | Self::CourierSelected { order_id, .. }
            | Self::PaymentInProgress { order_id, .. }
            | Self::Paid { order_id, .. }
            | Self::Pending { order_id, .. }
            | Self::Failed { order_id, .. }
            | Self::Closed { order_id, .. } => Some(*order_id),
        }
    }

    /// Courier options currently on offer.
    #[must_use]
    pub fn options(&self) -> &[CourierOption] {
        match self {
            Self::Idle | Self::OrderCreated { .. } => &[],
            Self::RatesLoaded { options, .. } => options,
            Self::CourierSelected { quote, .. }
            | Self::PaymentInProgress { quote, .. }
            | Self::Paid { quote, .. }
            | Self::Pending { quote, .. }
            | Self::Failed { quote, .. }
            | Self::Closed { quote, .. } => &quote.options,
        }
    }

    #[must_use]
    pub const fn selected(&self) -> Option<&CourierOption> {
        match self {
            Self::Idle | Self::OrderCreated { .. } | Self::RatesLoaded { .. } => None,
            Self::CourierSelected { quote, .. }
            | Self::PaymentInProgress { quote, .. }
            | Self::Paid { quote, .. }
            | Self::Pending { quote, .. }
            | Self::Failed { quote, .. }
            | Self::Closed { quote, .. } => Some(&quote.selected),
        }
    }

    /// Error from the last rate quote, if it failed.
    #[must_use]
    pub fn rates_error(&self) -> Option<&str> {
        match self {
            Self::OrderCreated { rates_error, .. } => rates_error.as_deref(),
            _ => None,
        }
    }

    /// Whether shipping rates may be requested now, including after a
    /// failed quote.
    #[must_use]
    pub const fn awaits_rates(&self) -> bool {
        matches!(self, Self::OrderCreated { .. })
    }

    /// Whether a payment attempt may start now.
    #[must_use]
    pub const fn can_start_payment(&self) -> bool {
        matches!(
            self,
            Self::CourierSelected { .. }
                | Self::PaymentInProgress { .. }
                | Self::Pending { .. }
                | Self::Failed { .. }
                | Self::Closed { .. }
        )
    }

    /// Apply an event.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidTransition` when the event is not
    /// allowed in the current state, or `CheckoutError::UnknownCourier`
    /// when selecting an option that was not quoted.
    pub fn transition(self, event: CheckoutEvent) -> Result<Self, CheckoutError> {
        let from = self.name();
        let event_name = event.name();
        let invalid = || CheckoutError::InvalidTransition {
            from,
            event: event_name,
        };

        match (self, event) {
            (Self::Idle, CheckoutEvent::OrderCreated(order_id)) => Ok(Self::OrderCreated {
                order_id,
                rates_error: None,
            }),

            (Self::OrderCreated { order_id, .. }, CheckoutEvent::RatesLoaded(options)) => {
                Ok(Self::RatesLoaded { order_id, options })
            }
            (Self::OrderCreated { order_id, .. }, CheckoutEvent::RatesFailed(message)) => {
                Ok(Self::OrderCreated {
                    order_id,
                    rates_error: Some(message),
                })
            }

            (Self::RatesLoaded { order_id, options }, CheckoutEvent::CourierSelected(id)) => {
                Ok(Self::CourierSelected {
                    order_id,
                    quote: Quote::select(options, &id)?,
                })
            }
            (
                Self::CourierSelected { order_id, quote }
                | Self::Pending { order_id, quote }
                | Self::Failed { order_id, quote }
                | Self::Closed { order_id, quote },
                CheckoutEvent::CourierSelected(id),
            ) => Ok(Self::CourierSelected {
                order_id,
                quote: Quote::select(quote.options, &id)?,
            }),

            (
                Self::CourierSelected { order_id, quote }
                | Self::PaymentInProgress { order_id, quote }
                | Self::Pending { order_id, quote }
                | Self::Failed { order_id, quote }
                | Self::Closed { order_id, quote },
                CheckoutEvent::PaymentStarted,
            ) => Ok(Self::PaymentInProgress { order_id, quote }),

            (Self::PaymentInProgress { order_id, quote }, CheckoutEvent::PaymentFinished(outcome)) => {
                Ok(match outcome {
                    PaymentOutcome::Success => Self::Paid { order_id, quote },
                    PaymentOutcome::Pending => Self::Pending { order_id, quote },
                    PaymentOutcome::Error => Self::Failed { order_id, quote },
                    PaymentOutcome::Closed => Self::Closed { order_id, quote },
                })
            }

            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bettabeal_core::Rupiah;

    use super::*;

    fn options() -> Vec<CourierOption> {
        ["JNE-REG-0", "TIKI-ECO-1"]
            .iter()
            .map(|id| CourierOption {
                id: (*id).to_string(),
                courier_name: "JNE".to_string(),
                courier_service_name: "Reguler".to_string(),
                courier_service_code: "REG".to_string(),
                duration: "1 - 2 days".to_string(),
                price: Rupiah::from_whole(9000),
            })
            .collect()
    }

    fn selected() -> CheckoutState {
        CheckoutState::Idle
            .transition(CheckoutEvent::OrderCreated(OrderId::new(5)))
            .unwrap()
            .transition(CheckoutEvent::RatesLoaded(options()))
            .unwrap()
            .transition(CheckoutEvent::CourierSelected("JNE-REG-0".to_string()))
            .unwrap()
    }

    #[test]
    fn test_happy_path() {
        let state = selected()
            .transition(CheckoutEvent::PaymentStarted)
            .unwrap()
            .transition(CheckoutEvent::PaymentFinished(PaymentOutcome::Success))
            .unwrap();
        assert_eq!(state.name(), "paid");
        assert_eq!(state.order_id(), Some(OrderId::new(5)));
        assert_eq!(state.selected().unwrap().id, "JNE-REG-0");
    }

    #[test]
    fn test_rates_require_an_order() {
        let err = CheckoutState::Idle
            .transition(CheckoutEvent::RatesLoaded(options()))
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InvalidTransition { from: "idle", .. }
        ));
        assert!(!CheckoutState::Idle.awaits_rates());
    }

    #[test]
    fn test_rates_failure_blocks_payment() {
        let state = CheckoutState::Idle
            .transition(CheckoutEvent::OrderCreated(OrderId::new(5)))
            .unwrap()
            .transition(CheckoutEvent::RatesFailed("Error: 400 - bad area".to_string()))
            .unwrap();
        assert_eq!(state.rates_error(), Some("Error: 400 - bad area"));
        assert!(!state.can_start_payment());
        assert!(state.transition(CheckoutEvent::PaymentStarted).is_err());
    }

    #[test]
    fn test_rates_can_load_after_failure() {
        let state = CheckoutState::Idle
            .transition(CheckoutEvent::OrderCreated(OrderId::new(5)))
            .unwrap()
            .transition(CheckoutEvent::RatesFailed("Error: 503 - down".to_string()))
            .unwrap();
        assert!(state.awaits_rates());
        let state = state.transition(CheckoutEvent::RatesLoaded(options())).unwrap();
        assert_eq!(state.name(), "rates_loaded");
        assert_eq!(state.rates_error(), None);
    }

    #[test]
    fn test_abandoned_payment_can_restart() {
        let in_progress = selected().transition(CheckoutEvent::PaymentStarted).unwrap();
        assert!(in_progress.can_start_payment());

        let restarted = in_progress.transition(CheckoutEvent::PaymentStarted).unwrap();
        assert_eq!(restarted.name(), "payment_in_progress");
        assert_eq!(restarted.selected().unwrap().id, "JNE-REG-0");
    }

    #[test]
    fn test_unknown_courier_rejected() {
        let state = CheckoutState::Idle
            .transition(CheckoutEvent::OrderCreated(OrderId::new(5)))
            .unwrap()
            .transition(CheckoutEvent::RatesLoaded(options()))
            .unwrap();
        let err = state
            .transition(CheckoutEvent::CourierSelected("POS-X-9".to_string()))
            .unwrap_err();
        assert!(matches!(err, CheckoutError::UnknownCourier(id) if id == "POS-X-9"));
    }

    #[test]
    fn test_retry_after_non_success_outcomes() {
        for outcome in [
            PaymentOutcome::Pending,
            PaymentOutcome::Error,
            PaymentOutcome::Closed,
        ] {
            let state = selected()
                .transition(CheckoutEvent::PaymentStarted)
                .unwrap()
                .transition(CheckoutEvent::PaymentFinished(outcome))
                .unwrap();
            assert!(state.can_start_payment());
            let reselected = state
                .transition(CheckoutEvent::CourierSelected("TIKI-ECO-1".to_string()))
                .unwrap();
            assert_eq!(reselected.selected().unwrap().id, "TIKI-ECO-1");
        }
    }

    #[test]
    fn test_payment_settles_once() {
        let paid = selected()
            .transition(CheckoutEvent::PaymentStarted)
            .unwrap()
            .transition(CheckoutEvent::PaymentFinished(PaymentOutcome::Success))
            .unwrap();
        assert!(paid
            .clone()
            .transition(CheckoutEvent::PaymentFinished(PaymentOutcome::Success))
            .is_err());
        assert!(paid.transition(CheckoutEvent::PaymentStarted).is_err());
    }

    #[test]
    fn test_serialized_tag() {
        let json = serde_json::to_value(selected()).unwrap();
        assert_eq!(json["state"], "courier_selected");
        let back: CheckoutState = serde_json::from_value(json).unwrap();
        assert_eq!(back, selected());
    }
}
