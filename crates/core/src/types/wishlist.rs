//! Wishlist entry type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::product::ProductSnapshot;

/// A saved product on the user's wishlist.
///
/// At most one entry exists per product ID. `added_at` is set when the
/// entry is first created and never changes afterwards, even when the
/// product snapshot is refreshed from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    /// Catalog product this entry refers to.
    pub product_id: ProductId,
    /// Snapshot of the product for offline display.
    pub product: ProductSnapshot,
    /// When the user first saved this product.
    pub added_at: DateTime<Utc>,
}

impl WishlistEntry {
    /// Create an entry for a product, stamped now.
    #[must_use]
    pub fn new(product: ProductSnapshot) -> Self {
        Self {
            product_id: product.id.clone(),
            product,
            added_at: Utc::now(),
        }
    }
}
