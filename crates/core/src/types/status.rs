//! Status enums for orders and users.
//!
//! The backend reports statuses as lowercase strings. Payment and fulfilment
//! are independent: `OrderStatus` tracks money, `ShippingStatus` tracks the
//! parcel.

use serde::{Deserialize, Serialize};

/// Order (payment-side) status as reported by the backend.
///
/// Unrecognised values deserialize to [`OrderStatus::Unknown`] rather than
/// failing the whole order payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    /// Payment settled at the gateway.
    Success,
    /// Marked paid by the storefront after the widget reported success.
    Paid,
    Failed,
    Expired,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Whether the money side of the order is settled.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Success | Self::Paid)
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingStatus {
    Processing,
    Shipped,
    Delivered,
}

impl ShippingStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
        }
    }

    /// Label shown in order listings. `shipped` reads as "SHIPPING".
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Processing => "PROCESSING",
            Self::Shipped => "SHIPPING",
            Self::Delivered => "DELIVERED",
        }
    }
}

impl std::fmt::Display for ShippingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShippingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            _ => Err(format!("invalid shipping status: {s}")),
        }
    }
}

/// Account role returned at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Customer,
    Seller,
    #[serde(other)]
    Unknown,
}

impl UserRole {
    /// Landing page after a successful login.
    #[must_use]
    pub const fn home_path(self) -> &'static str {
        match self {
            Self::Seller => "/dashboard",
            Self::Customer | Self::Unknown => "/",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Seller => write!(f, "seller"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
