//! Kirana CLI - drive a client session against a live backend.
//!
//! # Usage
//!
//! ```bash
//! # Store a bearer token for this and future invocations
//! kirana login <token>
//!
//! # Show the cart with derived totals
//! kirana cart show
//!
//! # Set a line's quantity (0 removes it)
//! kirana cart set-quantity p-123 3
//!
//! # List orders, newest first
//! kirana orders list
//!
//! # Cancel an order
//! kirana orders cancel o-456 --reason "ordered by mistake"
//!
//! # Pull the authoritative wishlist and show it
//! kirana wishlist sync
//!
//! # List saved addresses
//! kirana addresses
//!
//! # Log in and stream push notifications until Ctrl-C
//! kirana watch
//! ```
//!
//! Configuration comes from the environment (see `kirana-client`); a
//! `.env` file is honored.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};

use kirana_client::{ClientConfig, FileStore, HttpGateway, Session};

mod commands;

#[derive(Parser)]
#[command(name = "kirana")]
#[command(author, version, about = "Kirana shopping client CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or mutate the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Inspect or mutate orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Inspect or sync the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// List the user's saved addresses
    Addresses,
    /// Store a bearer token and connect the push channel
    Login {
        /// Bearer token issued by the backend
        token: String,
    },
    /// Drop the stored token and disconnect
    Logout,
    /// Connect the push channel and log notifications until Ctrl-C
    Watch,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and derived totals
    Show,
    /// Set a line's quantity (0 removes the line)
    SetQuantity {
        /// Product ID of the line
        product_id: String,
        /// New quantity
        quantity: u32,
    },
    /// Remove every line
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// Fetch and list orders, newest first
    List,
    /// Cancel an order
    Cancel {
        /// Order ID
        order_id: String,
        /// Reason passed to the backend
        #[arg(short, long, default_value = "cancelled from cli")]
        reason: String,
    },
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show locally-known entries
    Show,
    /// Pull the authoritative remote list, then show it
    Sync,
    /// Remove a product from the wishlist
    Remove {
        /// Product ID
        product_id: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let gateway = Arc::new(HttpGateway::new(&config));
    let persist = Arc::new(FileStore::new(config.data_dir.clone()));
    let session = Session::new(&config, gateway.clone(), persist);
    session.restore().await;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&session),
            CartAction::SetQuantity {
                product_id,
                quantity,
            } => commands::cart::set_quantity(&session, &product_id, quantity).await,
            CartAction::Clear => commands::cart::clear(&session).await,
        },
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list(&session).await?,
            OrdersAction::Cancel { order_id, reason } => {
                commands::orders::cancel(&session, &order_id, &reason).await?;
            }
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => commands::wishlist::show(&session),
            WishlistAction::Sync => commands::wishlist::sync(&session).await?,
            WishlistAction::Remove { product_id } => {
                commands::wishlist::remove(&session, &product_id).await;
            }
        },
        Commands::Addresses => commands::addresses::list(gateway.as_ref()).await?,
        Commands::Login { token } => commands::auth::login(&session, token).await,
        Commands::Logout => commands::auth::logout(&session).await,
        Commands::Watch => commands::watch::run(&session).await?,
    }
    Ok(())
}
