//! Cart state and the operations that change it.
//!
//! The backend owns the cart. The storefront keeps a [`CartSnapshot`] in
//! the visitor's session and patches it optimistically through the
//! [`reducer`] once a mutation is confirmed, instead of refetching after
//! every click. Drift against server truth is corrected by the next full
//! fetch.

pub mod reducer;
mod service;

pub use reducer::{CartAction, apply};
pub use service::{CartClient, CartError, CartSnapshot};
