//! Core types for the Kirana client.
//!
//! This module provides the domain model shared by the stores, the remote
//! gateway, and the CLI.

pub mod address;
pub mod cart;
pub mod event;
pub mod id;
pub mod money;
pub mod order;
pub mod product;
pub mod status;
pub mod wishlist;

pub use address::{Address, AddressKind};
pub use cart::CartLine;
pub use event::{EventKind, PushEvent};
pub use id::*;
pub use money::format_inr;
pub use order::{Order, OrderDraft, OrderLine, PaymentMethod};
pub use product::ProductSnapshot;
pub use status::OrderStatus;
pub use wishlist::WishlistEntry;
