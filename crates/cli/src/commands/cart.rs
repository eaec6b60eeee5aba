//! File-backed cart commands.
//!
//! # Usage
//!
//! ```bash
//! sg-cli cart add -i moon-rock -n "Moon Rock" -p 9.50 -q 2
//! sg-cli cart remove -i moon-rock
//! sg-cli cart show
//! sg-cli cart checkout
//! sg-cli cart clear
//! ```
//!
//! # Environment Variables
//!
//! - `SPACEGOODS_CART_DIR` - Directory holding the cart file (default: `.spacegoods`)
//! - `SPACEGOODS_WHATSAPP_NUMBER` - Number orders are handed off to

use std::path::Path;

use rust_decimal::Decimal;
use spacegoods_core::{AddToCart, Price, ProductId};
use spacegoods_storefront::cart::{Cart, CheckoutHandoff, FileStorage, HandoffLauncher};

/// Launcher that prints the chat link for the shopper to open.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintLauncher;

impl HandoffLauncher for PrintLauncher {
    #[allow(clippy::print_stdout)]
    fn launch(&self, handoff: &CheckoutHandoff) {
        println!("Open this link to send your order:");
        println!("{}", handoff.launch_url());
    }
}

fn open(dir: &Path) -> Cart<FileStorage> {
    let cart = Cart::new(FileStorage::new(dir));
    tracing::debug!(dir = %dir.display(), count = cart.count(), "Cart loaded");
    cart
}

#[allow(clippy::print_stdout)]
fn print_cart(cart: &Cart<FileStorage>) {
    println!("{}", cart.summary());
    if !cart.is_empty() {
        println!();
        println!("Items: {}", cart.badge().label);
        println!("Total: {}", spacegoods_core::format_money(cart.total()));
    }
}

/// Add an item to the cart.
///
/// # Errors
///
/// Returns an error if `price` is negative.
pub fn add(
    dir: &Path,
    id: &str,
    name: &str,
    price: Decimal,
    quantity: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let candidate = AddToCart::new(id, name, Price::new(price)?).with_quantity(quantity);

    let mut cart = open(dir);
    cart.add_item(candidate);
    print_cart(&cart);
    Ok(())
}

/// Remove an item from the cart.
pub fn remove(dir: &Path, id: &str) {
    let mut cart = open(dir);
    cart.remove_item(&ProductId::new(id));
    print_cart(&cart);
}

/// Empty the cart.
pub fn clear(dir: &Path) {
    let mut cart = open(dir);
    cart.clear();
    print_cart(&cart);
}

/// Print the cart.
pub fn show(dir: &Path) {
    print_cart(&open(dir));
}

/// Print the order summary and the chat link.
///
/// # Errors
///
/// Returns an error if the cart is empty.
#[allow(clippy::print_stdout)]
pub fn checkout(dir: &Path, destination: &str) -> Result<(), Box<dyn std::error::Error>> {
    let cart = open(dir);
    if let Some(prompt) = cart.confirmation_prompt() {
        println!("{prompt}");
        println!();
    }
    cart.checkout(destination, &PrintLauncher)?;
    Ok(())
}
