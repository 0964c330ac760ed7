//! Session lifecycle: one constructed object owning one user's containers.
//!
//! There is deliberately no ambient global state here - a `Session` is
//! created, injected into call sites, and disposed, which keeps tests
//! isolated and concurrent sessions possible. The push channel is wired to
//! the order store at connect time and torn down on logout.

use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use kirana_core::EventKind;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::gateway::RemoteGateway;
use crate::persist::{PersistenceAdapter, keys};
use crate::stores::{CartStore, OrderStore, WishlistStore};
use crate::sync::{Subscription, SyncChannel};

/// One authenticated (or anonymous) user's client state.
pub struct Session {
    /// The cart container.
    pub cart: CartStore,
    /// The wishlist container.
    pub wishlist: WishlistStore,
    /// The order container.
    pub orders: OrderStore,
    gateway: Arc<dyn RemoteGateway>,
    persist: Arc<dyn PersistenceAdapter>,
    channel: SyncChannel,
    push_wiring: Mutex<Vec<Subscription>>,
}

impl Session {
    /// Construct a session over the given gateway and persistence.
    #[must_use]
    pub fn new(
        config: &ClientConfig,
        gateway: Arc<dyn RemoteGateway>,
        persist: Arc<dyn PersistenceAdapter>,
    ) -> Self {
        Self {
            cart: CartStore::new(persist.clone(), config.pricing.clone()),
            wishlist: WishlistStore::new(gateway.clone(), persist.clone()),
            orders: OrderStore::new(gateway.clone(), persist.clone()),
            gateway,
            persist,
            channel: SyncChannel::new(),
            push_wiring: Mutex::new(Vec::new()),
        }
    }

    /// Hydrate every container from persisted state and pick up a stored
    /// auth token, if any. Call once, right after construction.
    pub async fn restore(&self) {
        self.cart.restore().await;
        self.wishlist.restore().await;
        self.orders.restore().await;

        match self.persist.load(keys::AUTH_TOKEN).await {
            Ok(Some(token)) if !token.is_empty() => {
                self.gateway.set_auth_token(Some(SecretString::from(token)));
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "failed to read stored auth token"),
        }
    }

    /// Adopt `token` for this session, persist it, and connect the push
    /// channel.
    ///
    /// # Errors
    ///
    /// Returns an error when the push channel cannot be opened; the token
    /// is kept either way, so request/response calls still work.
    pub async fn login(&self, token: SecretString) -> Result<()> {
        if let Err(e) = self
            .persist
            .save(keys::AUTH_TOKEN, token.expose_secret())
            .await
        {
            warn!(error = %e, "failed to persist auth token");
        }
        self.gateway.set_auth_token(Some(token));
        self.connect_push().await
    }

    /// Open the push channel and wire order notifications to a refetch.
    ///
    /// Requires an auth token on the gateway; the backend rejects anonymous
    /// subscriptions.
    pub async fn connect_push(&self) -> Result<()> {
        let stream = self.gateway.subscribe_events().await?;

        let mut wiring = self.lock_wiring();
        wiring.clear();
        for kind in [EventKind::OrderCreated, EventKind::OrderStatusUpdated] {
            let orders = self.orders.clone();
            wiring.push(self.channel.subscribe(kind, move |_event| {
                // The payload is a refetch signal, nothing more.
                let orders = orders.clone();
                tokio::spawn(async move { orders.on_push_notification().await });
            }));
        }
        drop(wiring);

        self.channel.connect(stream);
        info!("push channel connected");
        Ok(())
    }

    /// End the authenticated session: tear down the push channel (releasing
    /// every listener registration), forget the token, and keep cached
    /// store data for offline display.
    pub async fn logout(&self) {
        self.channel.disconnect();
        self.lock_wiring().clear();
        self.gateway.set_auth_token(None);
        if let Err(e) = self.persist.delete(keys::AUTH_TOKEN).await {
            warn!(error = %e, "failed to remove stored auth token");
        }
        info!("session logged out");
    }

    /// The session's push channel, for additional listeners (e.g. UI
    /// badges).
    #[must_use]
    pub const fn channel(&self) -> &SyncChannel {
        &self.channel
    }

    fn lock_wiring(&self) -> std::sync::MutexGuard<'_, Vec<Subscription>> {
        self.push_wiring.lock().expect("wiring lock poisoned")
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.channel.disconnect();
    }
}
