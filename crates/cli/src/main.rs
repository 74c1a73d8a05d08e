//! Zentro CLI - cart and wishlist from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart (falls back to the local cache when offline)
//! zentro cart show
//!
//! # Add two of product 7, then change a line's quantity
//! zentro cart add 7 --qty 2
//! zentro cart update 41 3
//!
//! # Toggle product 7 on the wishlist
//! zentro wishlist toggle 7
//!
//! # Browse the catalog
//! zentro products --search kurta --sort price_asc
//! ```
//!
//! # Environment Variables
//!
//! - `ZENTRO_BASE_URL` - Backend base URL (required)
//! - `ZENTRO_SESSION_COOKIE` - Session cookie for cart commands
//! - `ZENTRO_REQUEST_TIMEOUT_SECS` - Per-request timeout (default 5)
//! - `ZENTRO_CACHE_PATH` - Local cache file (default `.zentro-cache.json`)
//! - `SENTRY_DSN` - Error reporting

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zentro_core::{CartLineId, CategoryId, ProductId};
use zentro_storefront::StorefrontConfig;
use zentro_storefront::api::ProductSort;

mod commands;

use commands::{CliError, Session};

#[derive(Parser)]
#[command(name = "zentro")]
#[command(author, version, about = "Zentro storefront cart and wishlist")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Show header badge counts
    Badges,
    /// List products
    Products {
        /// Page number (1-indexed)
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Products per page (max 50)
        #[arg(short, long, default_value_t = 8)]
        limit: u32,

        /// Category ID
        #[arg(short, long)]
        category: Option<CategoryId>,

        /// Search text
        #[arg(short, long)]
        search: Option<String>,

        /// Sort order (`newest`, `price_asc`, `price_desc`)
        #[arg(long, default_value = "newest")]
        sort: ProductSort,
    },
    /// Delivery city
    City {
        #[command(subcommand)]
        action: CityAction,
    },
    /// Forget the cached cart and wishlist
    Logout,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and subtotal
    Show,
    /// Add a product
    Add {
        /// Product ID
        product_id: ProductId,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        qty: u32,
    },
    /// Set a cart line's quantity
    Update {
        /// Cart line ID (shown by `cart show`)
        line_id: CartLineId,

        /// New quantity (at least 1; use `remove` to drop a line)
        qty: u32,
    },
    /// Remove a cart line
    Remove {
        /// Cart line ID (shown by `cart show`)
        line_id: CartLineId,
    },
    /// Place an order for the current cart
    Checkout,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// List wishlisted products
    Show,
    /// Add the product if absent, remove it if present
    Toggle {
        /// Product ID
        product_id: ProductId,
    },
}

#[derive(Subcommand)]
enum CityAction {
    /// Show the delivery city
    Show,
    /// Set the delivery city
    Set {
        /// City name
        city: String,
    },
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

    Some(guard)
}

/// Warnings and errors become Sentry events, info and debug become breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = StorefrontConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "zentro_cli=info,zentro_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(CliError::from(e)),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CliError> {
    let session = Session::open(&config)?;

    let result = match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&session).await,
            CartAction::Add { product_id, qty } => {
                commands::cart::add(&session, product_id, qty).await
            }
            CartAction::Update { line_id, qty } => {
                commands::cart::update(&session, line_id, qty).await
            }
            CartAction::Remove { line_id } => commands::cart::remove(&session, line_id).await,
            CartAction::Checkout => commands::cart::checkout(&session).await,
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => {
                commands::wishlist::show(&session);
                Ok(())
            }
            WishlistAction::Toggle { product_id } => {
                commands::wishlist::toggle(&session, product_id);
                Ok(())
            }
        },
        Commands::Badges => {
            commands::cart::badges(&session).await;
            Ok(())
        }
        Commands::Products {
            page,
            limit,
            category,
            search,
            sort,
        } => commands::catalog::list(&session, page, limit, category, search, sort).await,
        Commands::City { action } => {
            match action {
                CityAction::Show => commands::prefs::show_city(&session),
                CityAction::Set { city } => commands::prefs::set_city(&session, &city),
            }
            Ok(())
        }
        Commands::Logout => {
            commands::prefs::logout(&session);
            Ok(())
        }
    };

    session.close();
    result
}
