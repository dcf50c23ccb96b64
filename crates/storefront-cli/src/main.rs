//! Storefront CLI - a command-line client for the storefront backend.
//!
//! Log in once and the session is kept on disk until it expires; every
//! later command reuses it.

mod commands;
mod format;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storefront_core::{ApiClient, Config};

use commands::App;

/// Log file name prefix inside the cache directory
const LOG_FILE_PREFIX: &str = "storefront.log";

/// Command-line client for the storefront backend
#[derive(Parser, Debug)]
#[command(name = "storefront", version)]
#[command(about = "Browse products and manage your cart from the terminal")]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Also write logs to a daily log file in the cache directory
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        address: String,
    },

    /// Log in and save the session
    Login {
        /// Account email (defaults to the last one used)
        #[arg(long)]
        email: Option<String>,
    },

    /// Forget the saved session
    Logout,

    /// Show whether a session is active and when it expires
    Status,

    /// Show the signed-in user's profile
    Whoami,

    /// List products
    Products {
        /// Only show this category
        #[arg(long)]
        category: Option<i64>,
        /// Case-insensitive name filter
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Show one product
    Product { id: i64 },

    /// List categories
    Categories,

    /// Show categories with their products
    Catalog,

    /// Show the cart
    Cart,

    /// Add a product to the cart
    CartAdd {
        product_id: i64,
        #[arg(short, long, default_value_t = 1)]
        quantity: i32,
    },

    /// Add one more of a product already in the cart
    CartIncrease { product_id: i64 },

    /// Take one away; removes the line when it reaches zero
    CartDecrease { product_id: i64 },

    /// Remove a product from the cart
    CartRemove { product_id: i64 },

    /// Show live exchange rates
    Rates {
        /// Comma-separated target currencies
        #[arg(long, default_value = "VND")]
        currencies: String,
        #[arg(long, default_value = "USD")]
        source: String,
        /// Convert this amount from the source currency
        #[arg(long)]
        amount: Option<f64>,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::load()?;

    let log_dir = if cli.log_file {
        Some(config.cache_dir()?)
    } else {
        None
    };
    let _guard = init_tracing(log_dir);
    info!("storefront starting");

    let store = Arc::new(config.open_store()?);
    let client = ApiClient::from_config(&config, store)?;

    let mut app = App::new(config, client, cli.json);
    app.run(cli.command).await
}
