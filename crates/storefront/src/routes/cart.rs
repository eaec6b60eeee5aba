//! Cart route handlers.
//!
//! The visitor's session is the cart's durable slot: each request restores a
//! [`Cart`] from the serialized snapshot kept in the session, applies one
//! operation, and writes the snapshot back. Two tabs sharing a session are
//! last-writer-wins.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Redirect},
};
use serde::{Deserialize, Serialize};
use spacegoods_core::{AddToCart, CartItem, ProductId, format_money};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{
    Badge, CART_STORAGE_KEY, Cart, CartStorage, CheckoutHandoff, LogLauncher, MemoryStorage,
};
use crate::error::{Result, add_breadcrumb};
use crate::state::AppState;

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            price: item.price.display(),
            line_price: format_money(item.line_total()),
        }
    }
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub count: u32,
    pub total: String,
    pub badge: Badge,
    pub summary: String,
}

impl<S: CartStorage> From<&Cart<S>> for CartView {
    fn from(cart: &Cart<S>) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            count: cart.count(),
            total: format_money(cart.total()),
            badge: cart.badge(),
            summary: cart.summary(),
        }
    }
}

/// Checkout handoff data for clients that open the chat themselves.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutView {
    pub destination: String,
    pub message: String,
    pub url: String,
    pub prompt: String,
}

/// Remove from cart request body.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCart {
    pub id: ProductId,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Build a slot seeded with the snapshot stored in the session.
async fn load_slot(session: &Session) -> Result<MemoryStorage> {
    let raw = session.get::<String>(CART_STORAGE_KEY).await?;
    Ok(raw.map_or_else(MemoryStorage::new, |raw| {
        MemoryStorage::new().with_entry(CART_STORAGE_KEY, raw)
    }))
}

/// Write the slot's snapshot back into the session.
async fn save_slot(session: &Session, mut slot: MemoryStorage) -> Result<()> {
    if let Some(raw) = slot.take(CART_STORAGE_KEY) {
        session.insert(CART_STORAGE_KEY, raw).await?;
    }
    Ok(())
}

async fn load_cart(session: &Session) -> Result<Cart<MemoryStorage>> {
    Ok(Cart::new(load_slot(session).await?))
}

/// Persist `cart` into the session and render it.
async fn finish(session: &Session, cart: Cart<MemoryStorage>) -> Result<Json<CartView>> {
    let view = CartView::from(&cart);
    save_slot(session, cart.into_storage()).await?;
    Ok(Json(view))
}

fn handoff_for(state: &AppState, cart: &Cart<MemoryStorage>) -> Result<CheckoutHandoff> {
    let destination = &state.config().checkout.whatsapp_number;
    Ok(cart.checkout(destination, &LogLauncher)?)
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add an item to the cart.
#[instrument(skip(session))]
pub async fn add(
    session: Session,
    body: std::result::Result<Json<AddToCart>, JsonRejection>,
) -> Result<Json<CartView>> {
    let Json(candidate) = body?;
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", candidate.id.as_str())]),
    );

    let mut cart = load_cart(&session).await?;
    cart.add_item(candidate);
    finish(&session, cart).await
}

/// Remove an item from the cart.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    body: std::result::Result<Json<RemoveFromCart>, JsonRejection>,
) -> Result<Json<CartView>> {
    let Json(body) = body?;
    let mut cart = load_cart(&session).await?;
    cart.remove_item(&body.id);
    finish(&session, cart).await
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.clear();
    finish(&session, cart).await
}

/// Compose the checkout message without redirecting.
#[instrument(skip(state, session))]
pub async fn checkout_handoff(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CheckoutView>> {
    let cart = load_cart(&session).await?;
    let handoff = handoff_for(&state, &cart)?;

    Ok(Json(CheckoutView {
        url: handoff.launch_url(),
        prompt: cart.confirmation_prompt().unwrap_or_default(),
        destination: handoff.destination,
        message: handoff.message,
    }))
}

/// Redirect to the WhatsApp chat with the order message.
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let cart = load_cart(&session).await?;
    let handoff = handoff_for(&state, &cart)?;
    Ok(Redirect::to(&handoff.launch_url()))
}
