//! Scoped key/value durable store.
//!
//! Every container persists its slice of state under a dedicated logical
//! key. Writes are best-effort from the containers' point of view: a failed
//! save is logged and the in-memory state stands. Callers await their own
//! writes, so writes to the same key are applied in issue order.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

/// Logical persistence keys used by the containers.
pub mod keys {
    /// Cart line items.
    pub const CART_LINES: &str = "cart.lines";
    /// Wishlist entries.
    pub const WISHLIST_ENTRIES: &str = "wishlist.entries";
    /// Last-known order list, for offline display.
    pub const ORDERS_CACHE: &str = "orders.cache";
    /// Bearer token of the authenticated session.
    pub const AUTH_TOKEN: &str = "auth.token";
}

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Scoped key/value durable store.
///
/// Values are opaque strings (the containers store JSON documents). An
/// implementation must survive process restart to be useful for offline
/// display, but `MemoryStore` exists for tests and ephemeral sessions.
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn save(&self, key: &str, value: &str) -> Result<(), PersistError>;

    /// Remove the value stored under `key`. Removing an absent key is a
    /// no-op.
    async fn delete(&self, key: &str) -> Result<(), PersistError>;
}

// =============================================================================
// FileStore
// =============================================================================

/// File-backed store: one JSON document per key under a scoped directory.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created on first
    /// write, not here.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

#[async_trait]
impl PersistenceAdapter for FileStore {
    async fn load(&self, key: &str) -> Result<Option<String>, PersistError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), PersistError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.path_for(key);
        let tmp = self.root.join(format!("{key}.json.tmp"));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), PersistError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistenceAdapter for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<String>, PersistError> {
        let entries = self.entries.lock().expect("persistence lock poisoned");
        Ok(entries.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let mut entries = self.entries.lock().expect("persistence lock poisoned");
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), PersistError> {
        let mut entries = self.entries.lock().expect("persistence lock poisoned");
        entries.remove(key);
        Ok(())
    }
}
