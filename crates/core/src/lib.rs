//! Kirana Core - Shared domain types.
//!
//! This crate provides the domain model used across all Kirana client
//! components:
//! - `client` - The synchronization and order-lifecycle engine
//! - `cli` - Command-line tools for driving a session against a backend
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! persistence. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - IDs, money formatting, products, cart lines, wishlist
//!   entries, orders, the order-status state machine, addresses, and push
//!   events

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
