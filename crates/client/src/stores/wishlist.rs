//! Wishlist state container.
//!
//! Optimistic and client-favoring: local mutations apply immediately, the
//! matching remote call is best-effort, and `sync()` replaces local state
//! with the server's list. Divergence after a failed remote call is
//! tolerated until the next sync; failures are logged so it is at least
//! observable.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use kirana_core::{ProductId, ProductSnapshot, WishlistEntry};

use crate::error::{Result, StoreError};
use crate::gateway::{GatewayError, RemoteGateway};
use crate::persist::{PersistenceAdapter, keys};

/// Outcome of an `add` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistAdd {
    /// A new entry was created.
    Added,
    /// The product was already on the wishlist; nothing changed.
    AlreadyPresent,
}

/// The wishlist container.
///
/// Cheap to clone; clones share the same underlying state.
#[derive(Clone)]
pub struct WishlistStore {
    entries: Arc<Mutex<Vec<WishlistEntry>>>,
    gateway: Arc<dyn RemoteGateway>,
    persist: Arc<dyn PersistenceAdapter>,
}

impl WishlistStore {
    /// Create an empty wishlist.
    #[must_use]
    pub fn new(gateway: Arc<dyn RemoteGateway>, persist: Arc<dyn PersistenceAdapter>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            gateway,
            persist,
        }
    }

    /// Hydrate entries from persisted state, if any.
    pub async fn restore(&self) {
        let stored = match self.persist.load(keys::WISHLIST_ENTRIES).await {
            Ok(Some(doc)) => doc,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "failed to read persisted wishlist");
                return;
            }
        };
        match serde_json::from_str::<Vec<WishlistEntry>>(&stored) {
            Ok(entries) => {
                *self.lock() = entries;
            }
            Err(e) => warn!(error = %e, "discarding unreadable persisted wishlist"),
        }
    }

    /// Save `product` to the wishlist.
    ///
    /// A duplicate add is a no-op reported as `AlreadyPresent`; the
    /// original entry and its `added_at` stay untouched. On a fresh add the
    /// local entry is created immediately and the remote add is attempted
    /// best-effort - a remote failure does not roll the entry back.
    pub async fn add(&self, product: ProductSnapshot) -> WishlistAdd {
        let product_id = product.id.clone();
        {
            let mut entries = self.lock();
            if entries.iter().any(|e| e.product_id == product_id) {
                return WishlistAdd::AlreadyPresent;
            }
            entries.push(WishlistEntry::new(product));
        }
        self.persist_entries().await;

        if let Err(e) = self.gateway.add_wishlist_item(&product_id).await {
            warn!(product = %product_id, error = %e, "remote wishlist add failed; keeping local entry");
        }
        WishlistAdd::Added
    }

    /// Remove `product_id` from the wishlist.
    ///
    /// Local truth wins: the entry is removed immediately and the remote
    /// removal is attempted best-effort. Removing an absent product is a
    /// no-op and makes no remote call.
    pub async fn remove(&self, product_id: &ProductId) {
        let existed = {
            let mut entries = self.lock();
            let before = entries.len();
            entries.retain(|e| &e.product_id != product_id);
            entries.len() != before
        };
        if !existed {
            debug!(product = %product_id, "wishlist remove of absent product");
            return;
        }
        self.persist_entries().await;

        if let Err(e) = self.gateway.remove_wishlist_item(product_id).await {
            warn!(product = %product_id, error = %e, "remote wishlist remove failed; local removal stands");
        }
    }

    /// Replace local entries with the authoritative remote list.
    ///
    /// On an auth-required failure the local entries are kept and the store
    /// continues in local-only mode; any other remote failure also leaves
    /// local state untouched.
    pub async fn sync(&self) -> Result<()> {
        match self.gateway.fetch_wishlist().await {
            Ok(entries) => {
                *self.lock() = entries;
                self.persist_entries().await;
                Ok(())
            }
            Err(GatewayError::AuthRequired) => {
                debug!("wishlist sync skipped: not authenticated");
                Err(StoreError::AuthRequired)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Current entries, cloned.
    #[must_use]
    pub fn entries(&self) -> Vec<WishlistEntry> {
        self.lock().clone()
    }

    /// Whether `product_id` is on the wishlist.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.lock().iter().any(|e| &e.product_id == product_id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<WishlistEntry>> {
        self.entries.lock().expect("wishlist lock poisoned")
    }

    async fn persist_entries(&self) {
        let doc = {
            let entries = self.lock();
            serde_json::to_string(&*entries)
        };
        let doc = match doc {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "failed to serialize wishlist");
                return;
            }
        };
        if let Err(e) = self.persist.save(keys::WISHLIST_ENTRIES, &doc).await {
            warn!(error = %e, "failed to persist wishlist");
        }
    }
}
