//! Core types for BettaBeal.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod phone;
pub mod price;
pub mod status;

pub use id::*;
pub use phone::{PhoneNumber, PhoneNumberError};
pub use price::Rupiah;
pub use status::*;
