//! BettaBeal Core - Shared types library.
//!
//! This crate provides common types used across the BettaBeal components:
//! - `storefront` - Customer storefront and seller dashboard backend-for-frontend
//! - `integration-tests` - End-to-end checks against a fake REST backend
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, rupiah amounts, phone
//!   numbers, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
