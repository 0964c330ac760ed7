//! Order state container and reconciliation.
//!
//! The remote order list is authoritative: `load()` replaces the in-memory
//! list wholesale, never merges. Status transitions are mirrored from the
//! backend, not decided locally - the one exception is the optimistic flip
//! to `cancelled` after the server has already confirmed a cancel.
//!
//! Because loads can be triggered from several places at once (container
//! init, push events, pull-to-refresh), responses can arrive out of order.
//! A monotonic sequence number guarantees that a superseded response never
//! overwrites a newer one: the last *issued* request wins.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use kirana_core::{Order, OrderDraft, OrderId};

use crate::error::{Result, StoreError};
use crate::gateway::{GatewayError, RemoteGateway};
use crate::persist::{PersistenceAdapter, keys};
use crate::stores::cart::CartStore;

struct OrdersState {
    orders: Vec<Order>,
    /// Sequence number of the most recently issued `load()`.
    issued_seq: u64,
    /// Sequence number of the load whose response last touched state.
    applied_seq: u64,
    /// Message from the most recent failed load, cleared on success.
    load_error: Option<String>,
    /// Set when the backend demanded authentication; cached data is kept
    /// and the store operates in local-only mode.
    auth_required: bool,
}

/// The order container.
///
/// Cheap to clone; clones share the same underlying state.
#[derive(Clone)]
pub struct OrderStore {
    state: Arc<Mutex<OrdersState>>,
    gateway: Arc<dyn RemoteGateway>,
    persist: Arc<dyn PersistenceAdapter>,
}

impl OrderStore {
    /// Create an empty order store.
    #[must_use]
    pub fn new(gateway: Arc<dyn RemoteGateway>, persist: Arc<dyn PersistenceAdapter>) -> Self {
        Self {
            state: Arc::new(Mutex::new(OrdersState {
                orders: Vec::new(),
                issued_seq: 0,
                applied_seq: 0,
                load_error: None,
                auth_required: false,
            })),
            gateway,
            persist,
        }
    }

    /// Hydrate from the cached order list for offline display.
    ///
    /// Cached data is display-only until the first successful `load()`
    /// replaces it with the authoritative list.
    pub async fn restore(&self) {
        let stored = match self.persist.load(keys::ORDERS_CACHE).await {
            Ok(Some(doc)) => doc,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "failed to read cached orders");
                return;
            }
        };
        match serde_json::from_str::<Vec<Order>>(&stored) {
            Ok(orders) => {
                let mut state = self.lock();
                // Only before any live response; a fetched list outranks
                // the cache.
                if state.applied_seq == 0 {
                    state.orders = orders;
                }
            }
            Err(e) => warn!(error = %e, "discarding unreadable order cache"),
        }
    }

    /// Fetch the authoritative order list and replace local state.
    ///
    /// On failure the last-known list is kept and the error is both
    /// recorded on the store and returned. A response belonging to a
    /// superseded request is discarded.
    pub async fn load(&self) -> Result<()> {
        let seq = {
            let mut state = self.lock();
            state.issued_seq += 1;
            state.issued_seq
        };

        match self.gateway.fetch_orders().await {
            Ok(mut orders) => {
                // Server ordering is not guaranteed; show newest first.
                orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                {
                    let mut state = self.lock();
                    if seq <= state.applied_seq {
                        debug!(seq, applied = state.applied_seq, "discarding stale order list");
                        return Ok(());
                    }
                    state.applied_seq = seq;
                    state.orders = orders;
                    state.load_error = None;
                    state.auth_required = false;
                }
                self.persist_cache().await;
                Ok(())
            }
            Err(GatewayError::AuthRequired) => {
                let mut state = self.lock();
                if seq > state.applied_seq {
                    state.auth_required = true;
                }
                debug!("order load skipped: not authenticated");
                Err(StoreError::AuthRequired)
            }
            Err(e) => {
                let err = StoreError::from(e);
                let mut state = self.lock();
                if seq > state.applied_seq {
                    state.load_error = Some(err.to_string());
                }
                Err(err)
            }
        }
    }

    /// Create an order from `draft` and, on success, clear the cart.
    ///
    /// The draft is validated before any network call. On failure nothing
    /// changes locally - the caller decides whether to retry.
    pub async fn create(&self, draft: OrderDraft, cart: &CartStore) -> Result<Order> {
        if draft.items.is_empty() {
            return Err(StoreError::InvalidDraft("no items".to_string()));
        }
        if draft.items.iter().any(|l| l.quantity == 0) {
            return Err(StoreError::InvalidDraft(
                "line with zero quantity".to_string(),
            ));
        }

        let order = self.gateway.create_order(&draft).await?;
        {
            let mut state = self.lock();
            state.orders.insert(0, order.clone());
        }
        self.persist_cache().await;
        cart.clear().await;
        Ok(order)
    }

    /// Cancel an order.
    ///
    /// A locally-known terminal order is rejected without a network call;
    /// everything else is the server's decision. On success the order is
    /// replaced with the server's updated record.
    pub async fn cancel(&self, order_id: &OrderId, reason: &str) -> Result<()> {
        if let Some(order) = self.get(order_id)
            && order.order_status.is_terminal()
        {
            return Err(StoreError::AlreadyTerminal(order.order_status));
        }

        let updated = self.gateway.cancel_order(order_id, reason).await?;
        {
            let mut state = self.lock();
            if let Some(slot) = state
                .orders
                .iter_mut()
                .find(|o| &o.order_id == order_id)
            {
                *slot = updated;
            } else {
                // Order unknown locally (cache miss); keep the server's
                // record rather than dropping it.
                state.orders.insert(0, updated);
            }
        }
        self.persist_cache().await;
        Ok(())
    }

    /// Handle a push notification by refetching the authoritative list.
    ///
    /// The event payload is deliberately not applied to state: a partial or
    /// stale payload must never cause drift.
    pub async fn on_push_notification(&self) {
        if let Err(e) = self.load().await {
            warn!(error = %e, "push-triggered order reload failed");
        }
    }

    /// Current orders, newest first, cloned.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.lock().orders.clone()
    }

    /// Look up one order.
    #[must_use]
    pub fn get(&self, order_id: &OrderId) -> Option<Order> {
        self.lock()
            .orders
            .iter()
            .find(|o| &o.order_id == order_id)
            .cloned()
    }

    /// Message from the most recent failed load, if the store is stale.
    #[must_use]
    pub fn load_error(&self) -> Option<String> {
        self.lock().load_error.clone()
    }

    /// Whether the backend demanded authentication on the last load.
    #[must_use]
    pub fn auth_required(&self) -> bool {
        self.lock().auth_required
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, OrdersState> {
        self.state.lock().expect("orders lock poisoned")
    }

    async fn persist_cache(&self) {
        let doc = {
            let state = self.lock();
            serde_json::to_string(&state.orders)
        };
        let doc = match doc {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "failed to serialize order cache");
                return;
            }
        };
        if let Err(e) = self.persist.save(keys::ORDERS_CACHE, &doc).await {
            warn!(error = %e, "failed to persist order cache");
        }
    }
}
