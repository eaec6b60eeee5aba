//! Cart line items, the persisted cart snapshot, and the add-to-cart payload.
//!
//! [`AddToCart`] is what buttons and other scripts send; it deserializes
//! leniently because its fields come from page markup (`data-product-price`
//! and friends) where anything can turn up. [`CartSnapshot`] is the unit of
//! persistence.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::id::ProductId;
use super::price::{Price, format_money};

/// Product ID used when an add-to-cart trigger carries none.
pub const DEFAULT_PRODUCT_ID: &str = "unknown";

/// Product name used when an add-to-cart trigger carries none.
pub const DEFAULT_PRODUCT_NAME: &str = "Product";

/// A single product line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product identifier, unique within a cart.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Number of units.
    pub quantity: u32,
}

impl CartItem {
    /// `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * self.quantity
    }

    /// Human readable line, e.g. `Moon Rock (x3) - $28.50`.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "{} (x{}) - {}",
            self.name,
            self.quantity,
            format_money(self.line_total())
        )
    }
}

impl From<AddToCart> for CartItem {
    fn from(candidate: AddToCart) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name,
            price: candidate.price,
            quantity: candidate.quantity,
        }
    }
}

/// Full persisted state of a cart: items in insertion order plus their count.
///
/// Both fields default when missing so that partially written slots still
/// parse.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartSnapshot {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub count: u32,
}

impl CartSnapshot {
    /// Whether the stored count matches the sum of item quantities.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.count == item_count(&self.items)
    }
}

/// Sum of quantities, saturating at `u32::MAX`.
#[must_use]
pub fn item_count(items: &[CartItem]) -> u32 {
    items
        .iter()
        .fold(0u32, |sum, item| sum.saturating_add(item.quantity))
}

/// An "item added" notification from a button or another script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddToCart {
    #[serde(default = "default_product_id")]
    pub id: ProductId,
    #[serde(default = "default_product_name")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Price,
    #[serde(default = "default_quantity", deserialize_with = "lenient_quantity")]
    pub quantity: u32,
}

impl AddToCart {
    /// Create a candidate for a single unit.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity: 1,
        }
    }

    /// Set the quantity; zero becomes one.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = if quantity == 0 { 1 } else { quantity };
        self
    }
}

fn default_product_id() -> ProductId {
    ProductId::new(DEFAULT_PRODUCT_ID)
}

fn default_product_name() -> String {
    DEFAULT_PRODUCT_NAME.to_owned()
}

const fn default_quantity() -> u32 {
    1
}

/// Parse a price from a JSON number or numeric string. Anything else,
/// including negative amounts, becomes zero.
fn lenient_price<'de, D>(deserializer: D) -> Result<Price, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let amount = match &value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    };
    Ok(amount.map_or(Price::ZERO, Price::coerce))
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Parse a quantity from a JSON number or numeric string. Missing, zero,
/// negative, or unparseable values become one.
fn lenient_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let quantity = match &value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().and_then(whole_units)),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .ok()
            .or_else(|| s.trim().parse::<f64>().ok().and_then(whole_units)),
        _ => None,
    };
    Ok(quantity
        .and_then(|q| u32::try_from(q).ok())
        .filter(|q| *q > 0)
        .unwrap_or(1))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range checked above
fn whole_units(f: f64) -> Option<u64> {
    (f.is_finite() && f >= 1.0 && f <= f64::from(u32::MAX)).then(|| f.trunc() as u64)
}
