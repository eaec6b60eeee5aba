//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with in-memory store; holds the cart slot)
//! 5. CORS (planet API is callable from any origin)
//!
//! Admin endpoints additionally use the [`RequireAdmin`] extractor.

pub mod admin;
pub mod request_id;
pub mod session;

pub use admin::RequireAdmin;
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
