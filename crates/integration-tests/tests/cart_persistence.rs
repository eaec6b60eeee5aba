//! Integration tests for file-backed carts across instances.
//!
//! Each `Cart` here stands in for a separate process run against the same
//! cart directory.

use std::fs;

use rust_decimal::Decimal;
use spacegoods_core::{AddToCart, Price, ProductId};
use spacegoods_storefront::cart::{CART_STORAGE_KEY, Cart, FileStorage};

fn moon_rock() -> AddToCart {
    AddToCart::new("moon-rock", "Moon Rock", Price::from_cents(950))
}

#[test]
fn test_cart_restored_by_next_instance() {
    let dir = tempfile::tempdir().expect("tempdir");

    let mut first = Cart::new(FileStorage::new(dir.path()));
    first.add_item(moon_rock().with_quantity(2));
    first.add_item(AddToCart::new("stardust", "Stardust", Price::from_cents(500)));
    drop(first);

    let second = Cart::new(FileStorage::new(dir.path()));
    assert_eq!(second.count(), 3);
    assert_eq!(second.total(), Decimal::new(2400, 2));
    assert_eq!(second.items()[0].id, ProductId::new("moon-rock"));
    assert_eq!(second.items()[1].id, ProductId::new("stardust"));
}

#[test]
fn test_legacy_numeric_prices_restore() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = FileStorage::new(dir.path());
    fs::write(
        storage.path_for(CART_STORAGE_KEY),
        r#"{"items":[{"id":"moon-rock","name":"Moon Rock","price":9.5,"quantity":2}],"count":2}"#,
    )
    .expect("write slot");

    let cart = Cart::new(storage);
    assert_eq!(cart.count(), 2);
    assert_eq!(cart.total(), Decimal::new(1900, 2));
}

#[test]
fn test_drifted_count_recomputed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = FileStorage::new(dir.path());
    fs::write(
        storage.path_for(CART_STORAGE_KEY),
        r#"{"items":[{"id":"a","name":"A","price":"1.00","quantity":4}],"count":9}"#,
    )
    .expect("write slot");

    let cart = Cart::new(storage);
    assert_eq!(cart.count(), 4);
}

#[test]
fn test_corrupt_slot_starts_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = FileStorage::new(dir.path());
    fs::write(storage.path_for(CART_STORAGE_KEY), "{not json").expect("write slot");

    let mut cart = Cart::new(storage);
    assert!(cart.is_empty());

    // The next mutation overwrites the corrupt slot
    cart.add_item(moon_rock());
    let reloaded = Cart::new(FileStorage::new(dir.path()));
    assert_eq!(reloaded.count(), 1);
}

#[test]
fn test_clear_persists() {
    let dir = tempfile::tempdir().expect("tempdir");

    let mut cart = Cart::new(FileStorage::new(dir.path()));
    cart.add_item(moon_rock());
    cart.clear();

    let reloaded = Cart::new(FileStorage::new(dir.path()));
    assert!(reloaded.is_empty());
    assert_eq!(reloaded.count(), 0);
}
