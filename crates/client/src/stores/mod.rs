//! Reducer-driven state containers.
//!
//! Each store owns its slice of state exclusively behind a mutex locked
//! only for synchronous reducer sections; I/O (gateway, persistence) always
//! happens outside the lock. Cross-container effects - order creation
//! clearing the cart - go through explicit calls, never shared mutable
//! references.

pub mod cart;
pub mod orders;
pub mod wishlist;

pub use cart::CartStore;
pub use orders::OrderStore;
pub use wishlist::{WishlistAdd, WishlistStore};
