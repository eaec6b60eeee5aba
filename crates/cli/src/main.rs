//! SpaceGoods CLI - file-backed cart and planet maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Add two moon rocks to the local cart
//! sg-cli cart add -i moon-rock -n "Moon Rock" -p 9.50 -q 2
//!
//! # Print the order and the WhatsApp link
//! sg-cli cart checkout
//!
//! # List planets on a running storefront
//! sg-cli planets list
//!
//! # Clear lapsed planet claims (scheduled job)
//! sg-cli planets reset-claims
//! ```
//!
//! # Commands
//!
//! - `cart` - Add, remove, clear, show and check out the local cart
//! - `planets` - List planets and reset lapsed claims via the storefront API

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use secrecy::SecretString;
use spacegoods_storefront::cart::DEFAULT_WHATSAPP_NUMBER;

mod commands;

#[derive(Parser)]
#[command(name = "sg-cli")]
#[command(author, version, about = "SpaceGoods CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the local cart
    Cart {
        /// Directory holding the cart file
        #[arg(long, env = "SPACEGOODS_CART_DIR", default_value = ".spacegoods")]
        dir: PathBuf,

        #[command(subcommand)]
        action: CartAction,
    },
    /// Talk to the planet API
    Planets {
        /// Storefront base URL
        #[arg(long, env = "SPACEGOODS_API_URL", default_value = "http://localhost:3000")]
        api_url: String,

        #[command(subcommand)]
        action: PlanetsAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add an item (repeat adds increase its quantity)
    Add {
        /// Product identifier
        #[arg(short, long)]
        id: String,

        /// Display name
        #[arg(short, long, default_value = "Product")]
        name: String,

        /// Unit price in dollars
        #[arg(short, long)]
        price: Decimal,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove an item entirely
    Remove {
        /// Product identifier
        #[arg(short, long)]
        id: String,
    },
    /// Empty the cart
    Clear,
    /// Print the cart
    Show,
    /// Print the order and the WhatsApp link
    Checkout {
        /// WhatsApp number, digits only
        #[arg(long, env = "SPACEGOODS_WHATSAPP_NUMBER", default_value = DEFAULT_WHATSAPP_NUMBER)]
        to: String,
    },
}

#[derive(Subcommand)]
enum PlanetsAction {
    /// List planets and their claim state
    List,
    /// Clear claims that have expired
    ResetClaims {
        /// Admin bearer token
        #[arg(long, env = "SPACEGOODS_ADMIN_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Cart { dir, action } => match action {
            CartAction::Add {
                id,
                name,
                price,
                quantity,
            } => commands::cart::add(&dir, &id, &name, price, quantity)?,
            CartAction::Remove { id } => commands::cart::remove(&dir, &id),
            CartAction::Clear => commands::cart::clear(&dir),
            CartAction::Show => commands::cart::show(&dir),
            CartAction::Checkout { to } => commands::cart::checkout(&dir, &to)?,
        },
        Commands::Planets { api_url, action } => match action {
            PlanetsAction::List => commands::planets::list(&api_url).await?,
            PlanetsAction::ResetClaims { token } => {
                let token = token.map(SecretString::from);
                commands::planets::reset_claims(&api_url, token.as_ref()).await?;
            }
        },
    }
    Ok(())
}
