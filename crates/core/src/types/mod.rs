//! Core types for SpaceGoods.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod planet;
pub mod price;
pub mod status;

pub use cart::{AddToCart, CartItem, CartSnapshot, item_count};
pub use id::*;
pub use planet::{NewPlanet, Planet};
pub use price::{MAX_PRICE, Price, PriceError, format_money, round_to_cents, saturating_sum};
pub use status::*;
