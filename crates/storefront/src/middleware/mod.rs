//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with in-memory store)
//!
//! Authentication is an extractor ([`RequireSession`]) rather than a layer,
//! so public routes need no exemption list.

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{RequireSession, RequireVerifiedSession};
pub use request_id::{RequestId, request_id_middleware};
pub use session::create_session_layer;
