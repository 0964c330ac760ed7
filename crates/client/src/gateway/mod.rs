//! Remote backend boundary.
//!
//! [`RemoteGateway`] abstracts every request/response call the engine makes
//! plus the push-channel subscription. Stores depend on the trait so tests
//! can substitute a scripted gateway; [`HttpGateway`] is the production
//! implementation over REST+JSON.

mod http;
mod wire;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use secrecy::SecretString;
use thiserror::Error;

use kirana_core::{Address, Order, OrderDraft, OrderId, ProductId, PushEvent, WishlistEntry};

pub use http::HttpGateway;

/// Errors from remote calls.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport-level failure (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The backend rejected the call for lack of authentication (401/403).
    #[error("authentication required")]
    AuthRequired,

    /// The response body did not match the expected shape.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Stream of decoded push events. Undecodable frames are logged and
/// skipped by the implementation; the stream ends when the connection
/// drops.
pub type EventStream = Pin<Box<dyn Stream<Item = PushEvent> + Send>>;

/// Request/response and push access to the backend.
///
/// Semantics the engine relies on:
/// - `fetch_orders` returns the authoritative order list; ordering is not
///   guaranteed by the server.
/// - `create_order` is not retried by the client; idempotency is the
///   server's responsibility.
/// - `fetch_wishlist` normalizes both wire shapes (flat and enveloped)
///   into [`WishlistEntry`] before returning.
/// - `subscribe_events` joins the per-user notification room and yields
///   events until disconnect.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Replace the bearer token used for subsequent calls.
    fn set_auth_token(&self, token: Option<SecretString>);

    /// Fetch the user's orders.
    async fn fetch_orders(&self) -> Result<Vec<Order>, GatewayError>;

    /// Create an order from a draft.
    async fn create_order(&self, draft: &OrderDraft) -> Result<Order, GatewayError>;

    /// Cancel an order; returns the updated order.
    async fn cancel_order(&self, order_id: &OrderId, reason: &str)
    -> Result<Order, GatewayError>;

    /// Fetch the user's wishlist.
    async fn fetch_wishlist(&self) -> Result<Vec<WishlistEntry>, GatewayError>;

    /// Add a product to the remote wishlist.
    async fn add_wishlist_item(&self, product_id: &ProductId) -> Result<(), GatewayError>;

    /// Remove a product from the remote wishlist.
    async fn remove_wishlist_item(&self, product_id: &ProductId) -> Result<(), GatewayError>;

    /// Fetch the user's saved addresses.
    async fn fetch_addresses(&self) -> Result<Vec<Address>, GatewayError>;

    /// Open the push channel for the authenticated user.
    async fn subscribe_events(&self) -> Result<EventStream, GatewayError>;
}
