//! QKart CLI - a command-line storefront.
//!
//! # Usage
//!
//! ```bash
//! # List every product
//! qkart products
//!
//! # Search the catalog
//! qkart search "running shoes"
//!
//! # Type into a search box line by line (debounced)
//! qkart browse
//!
//! # Cart
//! qkart cart
//! qkart add BW0jAAeDJmlZCF8i
//! qkart inc BW0jAAeDJmlZCF8i
//! qkart dec BW0jAAeDJmlZCF8i
//! qkart set BW0jAAeDJmlZCF8i 3
//! qkart checkout
//! ```
//!
//! # Environment Variables
//!
//! - `QKART_API_ENDPOINT` - Backend base URL (required)
//! - `QKART_SESSION_TOKEN` - Session token from login; cart commands need it
//! - `QKART_USERNAME` - Display name of the logged-in user
//! - `QKART_SEARCH_DEBOUNCE_MS` - Search quiet window (default 500)
//! - `QKART_CATALOG_CACHE_TTL_SECS` - Product listing cache TTL (default 300)
//! - `SENTRY_DSN` - Error tracking
//! - `RUST_LOG` - Log filter

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use qkart_storefront::config::StorefrontConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::{CommandError, Context};

#[derive(Parser)]
#[command(name = "qkart")]
#[command(author, version, about = "QKart command-line storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every product
    Products,
    /// Search products by name or category
    Search {
        /// Search text
        query: String,
    },
    /// Read search-box contents from stdin, one line per edit
    Browse,
    /// Show the cart
    Cart,
    /// Add a product to the cart
    Add {
        /// Product ID
        product_id: String,
    },
    /// Add one more unit of a product
    Inc {
        /// Product ID
        product_id: String,
    },
    /// Remove one unit of a product
    Dec {
        /// Product ID
        product_id: String,
    },
    /// Set the quantity of a product (0 removes it)
    Set {
        /// Product ID
        product_id: String,
        /// New quantity
        quantity: u32,
    },
    /// Show the order details for the cart
    Checkout,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "qkart_storefront=info,qkart_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let ctx = Context::new(config);

    match run(&ctx, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            output::failure(&e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(ctx: &Context, command: Commands) -> Result<(), CommandError> {
    match command {
        Commands::Products => commands::catalog::products(ctx).await,
        Commands::Search { query } => commands::catalog::search(ctx, &query).await,
        Commands::Browse => commands::browse::browse(ctx).await,
        Commands::Cart => commands::cart::show(ctx).await,
        Commands::Add { product_id } => commands::cart::add(ctx, &product_id).await,
        Commands::Inc { product_id } => commands::cart::increment(ctx, &product_id).await,
        Commands::Dec { product_id } => commands::cart::decrement(ctx, &product_id).await,
        Commands::Set {
            product_id,
            quantity,
        } => commands::cart::set(ctx, &product_id, quantity).await,
        Commands::Checkout => commands::cart::checkout(ctx).await,
    }
}
