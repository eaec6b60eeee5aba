//! Checkout handoff to an external messaging channel.
//!
//! Orders are not placed here. The cart composes one text message (summary
//! plus total) and hands it to a [`HandoffLauncher`], which opens a WhatsApp
//! chat with the shop. Delivery is never confirmed and the cart is left as is.

use rust_decimal::Decimal;
use serde::Serialize;
use spacegoods_core::format_money;
use thiserror::Error;

/// WhatsApp number orders are sent to when none is configured.
pub const DEFAULT_WHATSAPP_NUMBER: &str = "212708897624";

/// Base URL of WhatsApp click-to-chat links.
pub const WHATSAPP_BASE_URL: &str = "https://wa.me";

/// Errors from starting a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// There is nothing to order.
    #[error("Your cart is empty. Add some cosmic goods!")]
    EmptyCart,
}

/// A composed order message and where it should go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutHandoff {
    /// Destination phone number, digits only.
    pub destination: String,
    /// Message text.
    pub message: String,
}

impl CheckoutHandoff {
    /// Compose the order message for `summary` and `total`.
    #[must_use]
    pub fn compose(destination: impl Into<String>, summary: &str, total: Decimal) -> Self {
        let message = format!(
            "*New SpaceGoods Order!*\n\n\
             Hello! I'd like to place the following order:\n\n\
             {summary}\n\n\
             *Total: {}*\n\n\
             Please let me know the next steps. Thank you!",
            format_money(total)
        );

        Self {
            destination: destination.into(),
            message,
        }
    }

    /// Click-to-chat URL with the message percent-encoded.
    #[must_use]
    pub fn launch_url(&self) -> String {
        format!(
            "{WHATSAPP_BASE_URL}/{}?text={}",
            self.destination,
            urlencoding::encode(&self.message)
        )
    }
}

/// Text shown to the shopper before handing off.
#[must_use]
pub fn confirmation_prompt(summary: &str, total: Decimal) -> String {
    format!(
        "Your Order Summary:\n\n{summary}\n\nTotal: {}\n\nProceed to WhatsApp to complete your order?",
        format_money(total)
    )
}

/// Delivers a handoff to the messaging channel.
///
/// Implementations must not block on delivery; the cart treats the call as
/// fire-and-forget.
pub trait HandoffLauncher {
    fn launch(&self, handoff: &CheckoutHandoff);
}

/// Launcher that records the launch URL in the log and nothing else.
///
/// The HTTP server uses it: the browser does the actual redirect.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLauncher;

impl HandoffLauncher for LogLauncher {
    fn launch(&self, handoff: &CheckoutHandoff) {
        tracing::info!(
            destination = %handoff.destination,
            url = %handoff.launch_url(),
            "Checkout handed off"
        );
    }
}
