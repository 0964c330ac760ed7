//! Product snapshot type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A point-in-time copy of a catalog product.
///
/// The catalog can change underneath the client at any moment; snapshots
/// carried on cart lines and wishlist entries are what the user actually
/// saw. Stock and price are re-read from the snapshot on every cart
/// mutation, never from a live catalog reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// Catalog product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Price per unit in rupees.
    pub unit_price: Decimal,
    /// Units available at snapshot time.
    pub stock: u32,
    /// Primary image URL, for offline display.
    pub image_url: Option<String>,
}
