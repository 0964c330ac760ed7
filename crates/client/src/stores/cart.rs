//! Cart state container.
//!
//! Holds the live cart lines and their derived totals. Quantity rules are
//! enforced by clamping, never by erroring: an update that would exceed
//! stock clamps to stock, and one that would reach zero removes the line.
//! Every mutation persists the full line list best-effort - a failed save
//! is logged and the in-memory state stands.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use kirana_core::{CartLine, ProductId, ProductSnapshot};

use crate::config::PricingConfig;
use crate::persist::{PersistenceAdapter, keys};
use crate::pricing::{Totals, compute_totals};

struct CartState {
    lines: Vec<CartLine>,
    totals: Totals,
}

/// The cart container.
///
/// Cheap to clone; clones share the same underlying state.
#[derive(Clone)]
pub struct CartStore {
    state: Arc<Mutex<CartState>>,
    persist: Arc<dyn PersistenceAdapter>,
    pricing: PricingConfig,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new(persist: Arc<dyn PersistenceAdapter>, pricing: PricingConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(CartState {
                lines: Vec::new(),
                totals: Totals::empty(),
            })),
            persist,
            pricing,
        }
    }

    /// Hydrate the cart from persisted state, if any.
    ///
    /// A missing or unreadable document leaves the cart empty; the session
    /// must stay usable even when local storage is corrupt.
    pub async fn restore(&self) {
        let stored = match self.persist.load(keys::CART_LINES).await {
            Ok(Some(doc)) => doc,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "failed to read persisted cart");
                return;
            }
        };
        match serde_json::from_str::<Vec<CartLine>>(&stored) {
            Ok(lines) => {
                let mut state = self.lock();
                state.totals = compute_totals(&lines, &self.pricing);
                state.lines = lines;
                debug!(lines = state.lines.len(), "cart restored");
            }
            Err(e) => warn!(error = %e, "discarding unreadable persisted cart"),
        }
    }

    /// Add one unit of `product`.
    ///
    /// If the product is already in the cart its quantity is incremented
    /// (clamped to stock) and its price/stock are refreshed from the given
    /// snapshot; otherwise a new line with quantity 1 is inserted. An
    /// out-of-stock product is ignored.
    pub async fn add(&self, product: &ProductSnapshot) {
        if product.stock == 0 {
            debug!(product = %product.id, "ignoring add of out-of-stock product");
            return;
        }
        {
            let mut state = self.lock();
            if let Some(line) = state
                .lines
                .iter_mut()
                .find(|l| l.product_id == product.id)
            {
                // Re-validate against the fresh snapshot: the catalog may
                // have changed price or stock since the line was created.
                line.unit_price = product.unit_price;
                line.stock = product.stock;
                line.quantity = (line.quantity + 1).min(product.stock);
            } else {
                state.lines.push(CartLine::new(product, 1));
            }
            state.totals = compute_totals(&state.lines, &self.pricing);
        }
        self.persist_lines().await;
    }

    /// Remove the line for `product_id`. Removing an absent line is a
    /// no-op.
    pub async fn remove(&self, product_id: &ProductId) {
        {
            let mut state = self.lock();
            state.lines.retain(|l| &l.product_id != product_id);
            state.totals = compute_totals(&state.lines, &self.pricing);
        }
        self.persist_lines().await;
    }

    /// Set the quantity for `product_id`, clamped to `[0, stock]`; zero
    /// removes the line. Unknown product IDs are ignored.
    pub async fn set_quantity(&self, product_id: &ProductId, quantity: u32) {
        {
            let mut state = self.lock();
            let Some(line) = state
                .lines
                .iter_mut()
                .find(|l| &l.product_id == product_id)
            else {
                return;
            };
            let clamped = quantity.min(line.stock);
            if clamped == 0 {
                state.lines.retain(|l| &l.product_id != product_id);
            } else {
                line.quantity = clamped;
            }
            state.totals = compute_totals(&state.lines, &self.pricing);
        }
        self.persist_lines().await;
    }

    /// Empty the cart. Called by the order store after a successful order
    /// placement.
    pub async fn clear(&self) {
        {
            let mut state = self.lock();
            state.lines.clear();
            state.totals = Totals::empty();
        }
        self.persist_lines().await;
    }

    /// Current lines, cloned.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.lock().lines.clone()
    }

    /// Current derived totals.
    #[must_use]
    pub fn totals(&self) -> Totals {
        self.lock().totals.clone()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lock().lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().lines.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CartState> {
        self.state.lock().expect("cart lock poisoned")
    }

    async fn persist_lines(&self) {
        let doc = {
            let state = self.lock();
            serde_json::to_string(&state.lines)
        };
        let doc = match doc {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "failed to serialize cart lines");
                return;
            }
        };
        if let Err(e) = self.persist.save(keys::CART_LINES, &doc).await {
            warn!(error = %e, "failed to persist cart lines");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStore;
    use rust_decimal::Decimal;

    fn product(id: &str, unit_price: i64, stock: u32) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: format!("product {id}"),
            unit_price: Decimal::from(unit_price),
            stock,
            image_url: None,
        }
    }

    fn store() -> CartStore {
        CartStore::new(Arc::new(MemoryStore::new()), PricingConfig::default())
    }

    #[tokio::test]
    async fn add_inserts_then_increments() {
        let cart = store();
        let p = product("p-1", 200, 10);

        cart.add(&p).await;
        assert_eq!(cart.lines()[0].quantity, 1);

        cart.add(&p).await;
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.line_count(), 1);
    }

    #[tokio::test]
    async fn add_clamps_at_stock() {
        let cart = store();
        let p = product("p-1", 50, 2);
        for _ in 0..5 {
            cart.add(&p).await;
        }
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[tokio::test]
    async fn add_refreshes_price_from_snapshot() {
        let cart = store();
        cart.add(&product("p-1", 100, 10)).await;
        cart.add(&product("p-1", 120, 10)).await;
        let line = cart.lines().remove(0);
        assert_eq!(line.unit_price, Decimal::from(120));
        assert_eq!(line.quantity, 2);
    }

    #[tokio::test]
    async fn out_of_stock_add_is_ignored() {
        let cart = store();
        cart.add(&product("p-1", 100, 0)).await;
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn set_quantity_clamps_and_zero_removes() {
        let cart = store();
        cart.add(&product("p-1", 100, 5)).await;

        cart.set_quantity(&ProductId::new("p-1"), 99).await;
        assert_eq!(cart.lines()[0].quantity, 5);

        cart.set_quantity(&ProductId::new("p-1"), 3).await;
        assert_eq!(cart.lines()[0].quantity, 3);

        cart.set_quantity(&ProductId::new("p-1"), 0).await;
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn remove_is_noop_for_absent_line() {
        let cart = store();
        cart.add(&product("p-1", 100, 5)).await;
        cart.remove(&ProductId::new("p-9")).await;
        assert_eq!(cart.line_count(), 1);
    }

    #[tokio::test]
    async fn totals_recompute_on_every_mutation() {
        let cart = store();
        cart.add(&product("p-1", 200, 10)).await;
        cart.add(&product("p-1", 200, 10)).await;

        let totals = cart.totals();
        assert_eq!(totals.subtotal, Decimal::from(400));
        assert_eq!(totals.delivery_fee, Decimal::from(30));
        assert_eq!(totals.tax, Decimal::from(20));
        assert_eq!(totals.total, Decimal::from(450));

        cart.add(&product("p-1", 200, 10)).await;
        let totals = cart.totals();
        assert_eq!(totals.subtotal, Decimal::from(600));
        assert_eq!(totals.delivery_fee, Decimal::ZERO);
        assert_eq!(totals.tax, Decimal::from(30));
        assert_eq!(totals.total, Decimal::from(630));
    }

    #[tokio::test]
    async fn restore_round_trips_through_persistence() {
        let persist: Arc<dyn PersistenceAdapter> = Arc::new(MemoryStore::new());
        let cart = CartStore::new(persist.clone(), PricingConfig::default());
        cart.add(&product("p-1", 200, 10)).await;
        cart.add(&product("p-2", 45, 3)).await;

        let reopened = CartStore::new(persist, PricingConfig::default());
        reopened.restore().await;
        assert_eq!(reopened.line_count(), 2);
        assert_eq!(reopened.totals(), cart.totals());
    }

    #[tokio::test]
    async fn restore_discards_corrupt_document() {
        let persist: Arc<dyn PersistenceAdapter> = Arc::new(MemoryStore::new());
        persist
            .save(keys::CART_LINES, "not json")
            .await
            .expect("save");
        let cart = CartStore::new(persist, PricingConfig::default());
        cart.restore().await;
        assert!(cart.is_empty());
    }
}
