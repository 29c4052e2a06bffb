//! Checkout orchestration: order creation, courier quote, payment handoff
//! and status reconciliation.
//!
//! Each checkout is keyed by its order id and carried as a
//! [`CheckoutState`] between requests. Every step validates the state
//! before touching the network, so out-of-order calls fail fast.

mod orchestrator;
pub mod payment;
pub mod state;

pub use orchestrator::{CheckoutOrchestrator, CheckoutTotals, Settlement, SUCCESS_PATH};
pub use payment::{PaymentOutcome, PaymentSuccessMode, PaymentWidget};
pub use state::{CheckoutEvent, CheckoutState, Quote};

use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Cannot {event} while checkout is {from}")]
    InvalidTransition {
        from: &'static str,
        event: &'static str,
    },

    #[error("Unknown courier option: {0}")]
    UnknownCourier(String),

    #[error("Please select a shipping address")]
    NoAddressSelected,

    #[error("Failed to retrieve Snap token")]
    MissingSnapToken,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CheckoutError {
    /// Whether the backend refused the session token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_unauthorized())
    }
}
