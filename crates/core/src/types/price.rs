//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are always in US dollars, never negative, and at most
//! [`MAX_PRICE`]. Line totals saturate instead of overflowing. Display
//! formatting rounds half away from zero to two decimal places (`$28.50`).

use core::fmt;
use core::ops::Mul;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Largest accepted unit price: one trillion dollars.
///
/// `MAX_PRICE * u32::MAX` stays far below `Decimal::MAX`.
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),

    /// The amount is above [`MAX_PRICE`].
    #[error("price cannot exceed {max} (got {0})", max = MAX_PRICE)]
    TooLarge(Decimal),
}

/// A non-negative unit price in dollars.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero and
    /// [`PriceError::TooLarge`] if it is above [`MAX_PRICE`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if amount > MAX_PRICE {
            return Err(PriceError::TooLarge(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price, replacing negative amounts with zero and clamping
    /// anything above [`MAX_PRICE`].
    #[must_use]
    pub fn coerce(amount: Decimal) -> Self {
        match Self::new(amount) {
            Ok(price) => price,
            Err(PriceError::Negative(_)) => Self::ZERO,
            Err(PriceError::TooLarge(_)) => Self(MAX_PRICE),
        }
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// The amount in dollars.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format_money(self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Mul<u32> for Price {
    type Output = Decimal;

    fn mul(self, quantity: u32) -> Decimal {
        self.0
            .checked_mul(Decimal::from(quantity))
            .unwrap_or(Decimal::MAX)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Sum dollar amounts, saturating at `Decimal::MAX`.
#[must_use]
pub fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |sum, amount| {
            sum.checked_add(amount).unwrap_or(Decimal::MAX)
        })
}

/// Round a dollar amount to cents.
#[must_use]
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a dollar amount with a leading `$` and exactly two decimals.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", round_to_cents(amount))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_rejected() {
        assert_eq!(
            Price::new(Decimal::new(-1, 0)),
            Err(PriceError::Negative(Decimal::new(-1, 0)))
        );
    }

    #[test]
    fn test_coerce_negative_to_zero() {
        assert_eq!(Price::coerce(Decimal::new(-250, 2)), Price::ZERO);
        assert_eq!(
            Price::coerce(Decimal::new(250, 2)).amount(),
            Decimal::new(250, 2)
        );
    }

    #[test]
    fn test_display_pads_two_decimals() {
        assert_eq!(Price::coerce(Decimal::new(95, 1)).display(), "$9.50");
        assert_eq!(Price::coerce(Decimal::from(10)).display(), "$10.00");
        assert_eq!(Price::from_cents(1999).to_string(), "$19.99");
    }

    #[test]
    fn test_format_money_rounds_half_away_from_zero() {
        assert_eq!(format_money(Decimal::new(1005, 3)), "$1.01");
        assert_eq!(format_money(Decimal::new(1004, 3)), "$1.00");
    }

    #[test]
    fn test_line_total() {
        let price = Price::coerce(Decimal::new(95, 1));
        assert_eq!(price * 3, Decimal::new(285, 1));
    }

    #[test]
    fn test_max_price_is_one_trillion() {
        assert_eq!(MAX_PRICE, Decimal::from(1_000_000_000_000_i64));
    }

    #[test]
    fn test_too_large_rejected_and_clamped() {
        assert_eq!(
            Price::new(Decimal::MAX),
            Err(PriceError::TooLarge(Decimal::MAX))
        );
        assert_eq!(Price::coerce(Decimal::MAX).amount(), MAX_PRICE);
        assert!(Price::new(MAX_PRICE).is_ok());
    }

    #[test]
    fn test_line_total_at_limits_does_not_overflow() {
        let price = Price::coerce(Decimal::MAX);
        assert_eq!(price * u32::MAX, MAX_PRICE * Decimal::from(u32::MAX));
    }

    #[test]
    fn test_saturating_sum() {
        assert_eq!(saturating_sum([]), Decimal::ZERO);
        assert_eq!(
            saturating_sum([Decimal::new(150, 2), Decimal::new(250, 2)]),
            Decimal::new(4, 0)
        );
        assert_eq!(
            saturating_sum([Decimal::MAX, Decimal::MAX, Decimal::ONE]),
            Decimal::MAX
        );
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Price>("\"-3\"").is_err());
        let price: Price = serde_json::from_str("\"4.25\"").unwrap();
        assert_eq!(price.amount(), Decimal::new(425, 2));
    }
}
