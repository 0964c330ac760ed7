//! Push-channel subscription manager.
//!
//! One `SyncChannel` exists per session. Listeners register per event kind
//! and get a [`Subscription`] guard back; dropping or unsubscribing the
//! guard removes exactly that listener. Disconnecting tears the connection
//! down and releases every registration, so no handler leaks across
//! session boundaries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use kirana_core::{EventKind, PushEvent};

use crate::gateway::EventStream;

type Callback = Arc<dyn Fn(&PushEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: HashMap<EventKind, Vec<(u64, Callback)>>,
}

/// Subscription registry plus connection lifecycle for the push channel.
///
/// Cheap to clone; clones share the same registry and connection.
#[derive(Clone, Default)]
pub struct SyncChannel {
    registry: Arc<Mutex<Registry>>,
    connection: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SyncChannel {
    /// Create a channel with no listeners and no connection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for events of `kind`.
    ///
    /// Multiple listeners per kind are supported; each is independently
    /// removable via the returned guard.
    pub fn subscribe(
        &self,
        kind: EventKind,
        callback: impl Fn(&PushEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let mut registry = self.lock_registry();
        registry.next_id += 1;
        let id = registry.next_id;
        registry
            .listeners
            .entry(kind)
            .or_default()
            .push((id, Arc::new(callback)));
        Subscription {
            registry: Arc::downgrade(&self.registry),
            kind,
            id,
        }
    }

    /// Deliver `event` to every listener of its kind.
    pub fn dispatch(&self, event: &PushEvent) {
        let callbacks: Vec<Callback> = {
            let registry = self.lock_registry();
            registry
                .listeners
                .get(&event.kind())
                .map(|listeners| listeners.iter().map(|(_, cb)| cb.clone()).collect())
                .unwrap_or_default()
        };
        debug!(?event, fanout = callbacks.len(), "dispatching push event");
        for callback in callbacks {
            callback(event);
        }
    }

    /// Attach an event stream and start dispatching from it.
    ///
    /// Replaces any previous connection. Must be called from within a tokio
    /// runtime.
    pub fn connect(&self, stream: EventStream) {
        let channel = self.clone();
        let task = tokio::spawn(async move {
            let mut stream = stream;
            while let Some(event) = stream.next().await {
                channel.dispatch(&event);
            }
            info!("push channel stream ended");
        });
        let mut connection = self.lock_connection();
        if let Some(previous) = connection.replace(task) {
            previous.abort();
        }
    }

    /// Tear down the connection and release every listener registration.
    pub fn disconnect(&self) {
        if let Some(task) = self.lock_connection().take() {
            task.abort();
        }
        self.lock_registry().listeners.clear();
    }

    /// Whether a connection task is currently attached.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.lock_connection()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Number of live listener registrations, across all kinds.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock_registry()
            .listeners
            .values()
            .map(Vec::len)
            .sum()
    }

    fn lock_registry(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().expect("sync registry lock poisoned")
    }

    fn lock_connection(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.connection.lock().expect("sync connection lock poisoned")
    }
}

/// Guard for one listener registration.
///
/// Unsubscribing (explicitly or by dropping) removes exactly this
/// listener. Unsubscribing twice is a no-op.
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    kind: EventKind,
    id: u64,
}

impl Subscription {
    /// Remove this listener. Idempotent.
    pub fn unsubscribe(&self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.lock().expect("sync registry lock poisoned");
        if let Some(listeners) = registry.listeners.get_mut(&self.kind) {
            listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use kirana_core::OrderId;

    fn created_event() -> PushEvent {
        PushEvent::OrderCreated {
            order_id: OrderId::new("o-1"),
        }
    }

    fn status_event() -> PushEvent {
        PushEvent::OrderStatusUpdated {
            order_id: OrderId::new("o-1"),
            status: None,
        }
    }

    #[test]
    fn fan_out_reaches_every_listener_of_the_kind() {
        let channel = SyncChannel::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let first = hits.clone();
        let _sub_a = channel.subscribe(EventKind::OrderCreated, move |_| {
            first.fetch_add(1, Ordering::SeqCst);
        });
        let second = hits.clone();
        let _sub_b = channel.subscribe(EventKind::OrderCreated, move |_| {
            second.fetch_add(1, Ordering::SeqCst);
        });
        let wrong_kind = hits.clone();
        let _sub_c = channel.subscribe(EventKind::OrderStatusUpdated, move |_| {
            wrong_kind.fetch_add(100, Ordering::SeqCst);
        });

        channel.dispatch(&created_event());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unsubscribe_removes_only_that_listener() {
        let channel = SyncChannel::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let first = hits.clone();
        let sub_a = channel.subscribe(EventKind::OrderCreated, move |_| {
            first.fetch_add(1, Ordering::SeqCst);
        });
        let second = hits.clone();
        let _sub_b = channel.subscribe(EventKind::OrderCreated, move |_| {
            second.fetch_add(10, Ordering::SeqCst);
        });

        sub_a.unsubscribe();
        channel.dispatch(&created_event());
        assert_eq!(hits.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn double_unsubscribe_is_a_noop() {
        let channel = SyncChannel::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let sub = channel.subscribe(EventKind::OrderStatusUpdated, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        sub.unsubscribe();
        sub.unsubscribe();
        channel.dispatch(&status_event());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(channel.listener_count(), 0);
    }

    #[test]
    fn dropping_the_guard_unsubscribes() {
        let channel = SyncChannel::new();
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let counter = hits.clone();
            let _sub = channel.subscribe(EventKind::OrderCreated, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        channel.dispatch(&created_event());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn disconnect_releases_all_listeners() {
        let channel = SyncChannel::new();
        let _sub_a = channel.subscribe(EventKind::OrderCreated, |_| {});
        let _sub_b = channel.subscribe(EventKind::OrderStatusUpdated, |_| {});
        assert_eq!(channel.listener_count(), 2);

        channel.disconnect();
        assert_eq!(channel.listener_count(), 0);
        assert!(!channel.is_connected());
    }

    #[tokio::test]
    async fn connect_dispatches_stream_events() {
        let channel = SyncChannel::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let _sub = channel.subscribe(EventKind::OrderCreated, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let events = vec![created_event(), created_event()];
        channel.connect(Box::pin(futures::stream::iter(events)));

        // Let the reader task drain the stream.
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
