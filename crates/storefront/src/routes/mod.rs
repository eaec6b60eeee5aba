//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Health check
//!
//! # Cart (JSON, session-backed)
//! GET  /api/cart                     - Cart view
//! POST /api/cart/add                 - Add item (body: AddToCart)
//! POST /api/cart/remove              - Remove item (body: {"id": ...})
//! POST /api/cart/clear               - Empty the cart
//! GET  /api/cart/checkout            - Checkout message and chat URL
//!
//! # Checkout
//! GET  /checkout                     - Redirect to the WhatsApp chat
//!
//! # Planets (JSON, CORS enabled)
//! GET  /api/planets                  - List planets
//! POST /api/planets                  - Create planet
//! POST /api/planets/{id}/claim       - Claim planet (body: {"claimerId": ...})
//! POST /api/planets/reset-claims     - Clear lapsed claims (admin token)
//! ```

pub mod cart;
pub mod planets;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Create the cart API router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/checkout", get(cart::checkout_handoff))
}

/// Create the planet API router.
pub fn planet_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(planets::list).post(planets::create))
        .route("/reset-claims", post(planets::reset_claims))
        .route("/{id}/claim", post(planets::claim))
        .layer(CorsLayer::permissive())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/cart", cart_routes())
        .route("/checkout", get(cart::checkout))
        .nest("/api/planets", planet_routes())
}
