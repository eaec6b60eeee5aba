//! Cart count badge shown on the floating cart button and the nav bar.

use serde::Serialize;

/// Largest count shown as a number; anything above renders as `99+`.
pub const BADGE_MAX: u32 = 99;

/// Badge text and visibility derived from the cart count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub label: String,
    /// The floating button hides its badge for an empty cart.
    pub visible: bool,
}

impl Badge {
    #[must_use]
    pub fn from_count(count: u32) -> Self {
        let label = if count > BADGE_MAX {
            format!("{BADGE_MAX}+")
        } else {
            count.to_string()
        };

        Self {
            label,
            visible: count > 0,
        }
    }
}
