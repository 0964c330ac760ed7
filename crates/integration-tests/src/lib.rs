//! Test support for the Kirana client engine.
//!
//! Provides [`MockGateway`], a scripted in-process implementation of
//! `RemoteGateway`, plus fixture builders. Scenario tests live in
//! `tests/`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;

use kirana_client::{EventStream, GatewayError, RemoteGateway};
use kirana_core::{
    Address, AddressKind, CartLine, Order, OrderDraft, OrderId, OrderStatus, ProductId,
    ProductSnapshot, PushEvent, WishlistEntry,
};

// =============================================================================
// Fixtures
// =============================================================================

/// A product snapshot with the given price and stock.
#[must_use]
pub fn product(id: &str, unit_price: i64, stock: u32) -> ProductSnapshot {
    ProductSnapshot {
        id: ProductId::new(id),
        name: format!("product {id}"),
        unit_price: Decimal::from(unit_price),
        stock,
        image_url: None,
    }
}

/// A deliverable test address.
#[must_use]
pub fn address() -> Address {
    Address {
        name: "A. Kumar".to_string(),
        phone: "9876543210".to_string(),
        line1: "12 MG Road".to_string(),
        landmark: Some("opposite the water tank".to_string()),
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        pincode: "560001".to_string(),
        kind: AddressKind::Home,
        is_default: true,
    }
}

/// An order with a unique ID in the given status, created at `created_at`.
#[must_use]
pub fn order(status: OrderStatus, created_at: DateTime<Utc>) -> Order {
    let id = uuid::Uuid::new_v4();
    Order {
        order_id: OrderId::new(format!("o-{id}")),
        order_number: format!("KIR-{}", &id.simple().to_string()[..8]),
        items: Vec::new(),
        delivery_address: address(),
        subtotal: Decimal::from(400),
        delivery_fee: Decimal::from(30),
        tax: Decimal::from(20),
        total_amount: Decimal::from(450),
        payment_method: kirana_core::PaymentMethod::Cod,
        order_status: status,
        created_at,
    }
}

/// A wishlist entry for `product_id`, stamped `added_at`.
#[must_use]
pub fn wishlist_entry(product_id: &str, added_at: DateTime<Utc>) -> WishlistEntry {
    let snapshot = product(product_id, 99, 10);
    WishlistEntry {
        product_id: snapshot.id.clone(),
        product: snapshot,
        added_at,
    }
}

// =============================================================================
// MockGateway
// =============================================================================

/// One scripted response for `fetch_orders`.
struct OrdersResponse {
    result: Result<Vec<Order>, ScriptedError>,
    delay: Duration,
}

/// Cloneable stand-in for `GatewayError` so scripts can be queued.
#[derive(Debug, Clone)]
pub enum ScriptedError {
    /// Maps to `GatewayError::AuthRequired`.
    AuthRequired,
    /// Maps to `GatewayError::Api` with status 503.
    Remote(String),
}

impl From<ScriptedError> for GatewayError {
    fn from(err: ScriptedError) -> Self {
        match err {
            ScriptedError::AuthRequired => Self::AuthRequired,
            ScriptedError::Remote(message) => Self::Api {
                status: 503,
                message,
            },
        }
    }
}

#[derive(Default)]
struct MockState {
    token: Option<String>,
    orders_script: VecDeque<OrdersResponse>,
    /// Served when the script runs dry.
    orders_fallback: Vec<Order>,
    create_failure: Option<ScriptedError>,
    wishlist_remote: Vec<WishlistEntry>,
    wishlist_failure: Option<ScriptedError>,
    calls: Vec<String>,
    push_senders: Vec<futures::channel::mpsc::UnboundedSender<PushEvent>>,
}

/// Scripted in-process gateway.
///
/// Every call is recorded in an inspectable log. Order-list responses can
/// be queued with individual delays to exercise out-of-order arrival.
#[derive(Clone, Default)]
pub struct MockGateway {
    state: Arc<Mutex<MockState>>,
}

impl MockGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock lock poisoned")
    }

    /// Queue a successful `fetch_orders` response, served after `delay`.
    pub fn script_orders(&self, orders: Vec<Order>, delay: Duration) {
        self.lock().orders_script.push_back(OrdersResponse {
            result: Ok(orders),
            delay,
        });
    }

    /// Queue a failing `fetch_orders` response.
    pub fn script_orders_failure(&self, error: ScriptedError) {
        self.lock().orders_script.push_back(OrdersResponse {
            result: Err(error),
            delay: Duration::ZERO,
        });
    }

    /// Orders served once the script runs dry.
    pub fn set_orders(&self, orders: Vec<Order>) {
        self.lock().orders_fallback = orders;
    }

    /// Make the next `create_order` fail.
    pub fn fail_next_create(&self, error: ScriptedError) {
        self.lock().create_failure = Some(error);
    }

    /// Set the remote wishlist served by `fetch_wishlist`.
    pub fn set_wishlist(&self, entries: Vec<WishlistEntry>) {
        self.lock().wishlist_remote = entries;
    }

    /// Make every wishlist add/remove call fail.
    pub fn fail_wishlist_mutations(&self, error: ScriptedError) {
        self.lock().wishlist_failure = Some(error);
    }

    /// Push `event` to every open subscription.
    pub fn push(&self, event: &PushEvent) {
        let senders = self.lock().push_senders.clone();
        for sender in senders {
            let _ = sender.unbounded_send(event.clone());
        }
    }

    /// Recorded call names, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Number of `fetch_orders` calls recorded.
    #[must_use]
    pub fn fetch_orders_count(&self) -> usize {
        self.calls().iter().filter(|c| *c == "fetch_orders").count()
    }

    /// The bearer token the engine last set, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    fn record(&self, call: &str) {
        self.lock().calls.push(call.to_string());
    }
}

#[async_trait]
impl RemoteGateway for MockGateway {
    fn set_auth_token(&self, token: Option<SecretString>) {
        use secrecy::ExposeSecret;
        self.lock().token = token.map(|t| t.expose_secret().to_string());
    }

    async fn fetch_orders(&self) -> Result<Vec<Order>, GatewayError> {
        self.record("fetch_orders");
        let scripted = self.lock().orders_script.pop_front();
        match scripted {
            Some(response) => {
                if response.delay > Duration::ZERO {
                    tokio::time::sleep(response.delay).await;
                }
                response.result.map_err(Into::into)
            }
            None => Ok(self.lock().orders_fallback.clone()),
        }
    }

    async fn create_order(&self, draft: &OrderDraft) -> Result<Order, GatewayError> {
        self.record("create_order");
        if let Some(error) = self.lock().create_failure.take() {
            return Err(error.into());
        }

        let subtotal: Decimal = draft.items.iter().map(|l| l.line_total).sum();
        let id = uuid::Uuid::new_v4();
        Ok(Order {
            order_id: OrderId::new(format!("o-{id}")),
            order_number: format!("KIR-{}", &id.simple().to_string()[..8]),
            items: draft.items.clone(),
            delivery_address: draft.delivery_address.clone(),
            subtotal,
            delivery_fee: Decimal::ZERO,
            tax: Decimal::ZERO,
            total_amount: subtotal,
            payment_method: draft.payment_method,
            order_status: OrderStatus::Pending,
            created_at: Utc::now(),
        })
    }

    async fn cancel_order(
        &self,
        order_id: &OrderId,
        _reason: &str,
    ) -> Result<Order, GatewayError> {
        self.record("cancel_order");
        let known = {
            let state = self.lock();
            state
                .orders_fallback
                .iter()
                .find(|o| &o.order_id == order_id)
                .cloned()
        };
        let mut updated = known.unwrap_or_else(|| order(OrderStatus::Pending, Utc::now()));
        updated.order_id = order_id.clone();
        updated.order_status = OrderStatus::Cancelled;
        Ok(updated)
    }

    async fn fetch_wishlist(&self) -> Result<Vec<WishlistEntry>, GatewayError> {
        self.record("fetch_wishlist");
        if self.lock().token.is_none() {
            return Err(GatewayError::AuthRequired);
        }
        Ok(self.lock().wishlist_remote.clone())
    }

    async fn add_wishlist_item(&self, product_id: &ProductId) -> Result<(), GatewayError> {
        self.record(&format!("add_wishlist_item:{product_id}"));
        if let Some(error) = self.lock().wishlist_failure.clone() {
            return Err(error.into());
        }
        Ok(())
    }

    async fn remove_wishlist_item(&self, product_id: &ProductId) -> Result<(), GatewayError> {
        self.record(&format!("remove_wishlist_item:{product_id}"));
        if let Some(error) = self.lock().wishlist_failure.clone() {
            return Err(error.into());
        }
        Ok(())
    }

    async fn fetch_addresses(&self) -> Result<Vec<Address>, GatewayError> {
        self.record("fetch_addresses");
        Ok(vec![address()])
    }

    async fn subscribe_events(&self) -> Result<EventStream, GatewayError> {
        self.record("subscribe_events");
        if self.lock().token.is_none() {
            return Err(GatewayError::AuthRequired);
        }
        let (tx, rx) = futures::channel::mpsc::unbounded();
        self.lock().push_senders.push(tx);
        Ok(Box::pin(rx))
    }
}

/// A cart line built from a product fixture.
#[must_use]
pub fn cart_line(id: &str, unit_price: i64, stock: u32, quantity: u32) -> CartLine {
    CartLine::new(&product(id, unit_price, stock), quantity)
}
