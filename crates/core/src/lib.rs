//! SpaceGoods Core - Shared types library.
//!
//! This crate provides common types used across all SpaceGoods components:
//! - `storefront` - Cart manager, planet API, and the HTTP server
//! - `cli` - Command-line cart and planet tools
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, cart items and snapshots, planets

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
