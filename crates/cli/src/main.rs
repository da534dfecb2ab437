//! GoMarketplace CLI - Inspect and edit the persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! gm-cart show
//!
//! # Add a product (one unit; adding again bumps the quantity)
//! gm-cart add --id p1 --title "Mug" --image-url https://cdn/mug.png --price 12.50
//!
//! # Change quantities
//! gm-cart increment p1
//! gm-cart decrement p1
//! ```
//!
//! # Commands
//!
//! - `show` - Print the cart
//! - `add` - Add one unit of a product
//! - `increment` - Add one unit to an existing line
//! - `decrement` - Remove one unit from a line (never below 1)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use go_marketplace_core::{NewLineItem, ProductId};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::cart::CartAction;
use config::{CliConfig, LogFormat};

#[derive(Parser)]
#[command(name = "gm-cart")]
#[command(author, version, about = "GoMarketplace cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        #[arg(long)]
        id: String,

        /// Display name
        #[arg(short, long)]
        title: String,

        /// Display image reference
        #[arg(short, long)]
        image_url: String,

        /// Unit price
        #[arg(short, long)]
        price: Decimal,
    },
    /// Add one unit to an existing line
    Increment {
        /// Product ID
        id: String,
    },
    /// Remove one unit from a line (a line at 1 stays at 1)
    Decrement {
        /// Product ID
        id: String,
    },
}

impl From<Commands> for CartAction {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Show => Self::Show,
            Commands::Add {
                id,
                title,
                image_url,
                price,
            } => Self::Add(NewLineItem::new(id, title, image_url, price)),
            Commands::Increment { id } => Self::Increment(ProductId::from(id)),
            Commands::Decrement { id } => Self::Decrement(ProductId::from(id)),
        }
    }
}

/// Initialize tracing with `EnvFilter`, writing to stderr so stdout stays clean.
fn init_tracing(format: LogFormat) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "go_marketplace_cart=info,go_marketplace_cli=info".into());

    let json = format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::default());
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(config.log_format);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    commands::cart::run(config, CartAction::from(cli.command)).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "gm-cart",
            "add",
            "--id",
            "p1",
            "--title",
            "Mug",
            "--image-url",
            "https://cdn/mug.png",
            "--price",
            "12.50",
        ])
        .unwrap();

        let CartAction::Add(product) = CartAction::from(cli.command) else {
            panic!("expected add action");
        };
        assert_eq!(product.id, "p1");
        assert_eq!(product.price, Decimal::new(1250, 2));
    }

    #[test]
    fn test_parse_decrement() {
        let cli = Cli::try_parse_from(["gm-cart", "decrement", "p9"]).unwrap();
        assert!(matches!(
            CartAction::from(cli.command),
            CartAction::Decrement(id) if id == "p9"
        ));
    }

    #[test]
    fn test_rejects_bad_price() {
        assert!(Cli::try_parse_from([
            "gm-cart", "add", "--id", "p1", "--title", "T", "--image-url", "u", "--price", "free",
        ])
        .is_err());
    }
}
