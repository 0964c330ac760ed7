//! Kirana Client - synchronization and order-lifecycle engine.
//!
//! This crate keeps a shopping client's state (cart, wishlist, orders)
//! consistent across three sources of truth that move at different speeds:
//!
//! - user-initiated local edits (add to cart, save to wishlist),
//! - the remote catalog/order backend reached over request/response calls,
//! - a push channel announcing server-side order changes out of band.
//!
//! # Architecture
//!
//! - [`persist`] - scoped key/value durable store (survives restart)
//! - [`gateway`] - the remote backend boundary: a trait plus an HTTP
//!   implementation
//! - [`pricing`] - pure derivation of subtotal / delivery fee / tax / total
//! - [`stores`] - the three state containers (cart, wishlist, orders)
//! - [`sync`] - push-channel subscription registry and connection lifecycle
//! - [`session`] - the `create -> use -> dispose` object that owns one
//!   user's containers and push channel
//!
//! Containers never throw across their public boundary for expected
//! failures; every mutating operation returns a `Result` whose error is
//! printable for UI feedback. State lives behind mutexes locked only for
//! synchronous reducer sections - the only interleaving points are remote
//! calls, persistence calls, and the push stream.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod gateway;
pub mod persist;
pub mod pricing;
pub mod session;
pub mod stores;
pub mod sync;

pub use config::{ClientConfig, ConfigError, PricingConfig};
pub use error::{Result, StoreError};
pub use gateway::{EventStream, GatewayError, HttpGateway, RemoteGateway};
pub use persist::{FileStore, MemoryStore, PersistenceAdapter};
pub use pricing::{Totals, compute_totals};
pub use session::Session;
pub use stores::{CartStore, OrderStore, WishlistAdd, WishlistStore};
pub use sync::{Subscription, SyncChannel};
