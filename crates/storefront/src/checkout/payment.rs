//! Payment widget seam.
//!
//! The gateway's widget runs in the visitor's browser and reports back
//! through one of four callbacks. Here that becomes a single awaited
//! [`PaymentOutcome`], so the orchestrator never sees the callback shape.

use std::future::Future;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a payment attempt ended, as reported by the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Success,
    Pending,
    Error,
    /// The visitor dismissed the widget.
    Closed,
}

impl PaymentOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Pending => "pending",
            Self::Error => "error",
            Self::Closed => "closed",
        }
    }
}

/// Runs a payment for a snap token and resolves once the widget reports.
pub trait PaymentWidget {
    fn pay(&self, snap_token: &str) -> impl Future<Output = PaymentOutcome> + Send;
}

/// What the storefront does once the widget reports success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentSuccessMode {
    /// Mark the order `paid` on the backend immediately.
    #[default]
    MarkPaid,
    /// Send the visitor to the success page and leave the status update to
    /// the gateway's webhook.
    Redirect,
}

impl PaymentSuccessMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MarkPaid => "mark_paid",
            Self::Redirect => "redirect",
        }
    }
}

impl FromStr for PaymentSuccessMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mark_paid" => Ok(Self::MarkPaid),
            "redirect" => Ok(Self::Redirect),
            other => Err(format!("expected mark_paid or redirect, got {other:?}")),
        }
    }
}
