//! Scenario tests for the order container: creation, cancellation,
//! reconciliation, and the interplay with the cart.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use kirana_client::{
    CartStore, MemoryStore, OrderStore, PersistenceAdapter, PricingConfig, StoreError,
};
use kirana_core::{OrderDraft, OrderStatus, PaymentMethod};
use kirana_integration_tests::{MockGateway, ScriptedError, address, order, product};

fn stores() -> (MockGateway, CartStore, OrderStore) {
    let gateway = MockGateway::new();
    let persist: Arc<dyn PersistenceAdapter> = Arc::new(MemoryStore::new());
    let cart = CartStore::new(persist.clone(), PricingConfig::default());
    let orders = OrderStore::new(Arc::new(gateway.clone()), persist);
    (gateway, cart, orders)
}

#[tokio::test]
async fn successful_create_clears_the_cart() {
    let (_gateway, cart, orders) = stores();
    cart.add(&product("p-1", 200, 10)).await;
    cart.add(&product("p-1", 200, 10)).await;

    let draft = OrderDraft::from_cart_lines(&cart.lines(), address(), PaymentMethod::Cod);
    let created = orders.create(draft, &cart).await.expect("create");

    assert!(cart.is_empty());
    assert_eq!(cart.totals().total, Decimal::ZERO);
    assert_eq!(orders.orders()[0].order_id, created.order_id);
    assert_eq!(created.items.len(), 1);
    assert_eq!(created.items[0].quantity, 2);
}

#[tokio::test]
async fn failed_create_leaves_everything_untouched() {
    let (gateway, cart, orders) = stores();
    cart.add(&product("p-1", 200, 10)).await;
    gateway.fail_next_create(ScriptedError::Remote("payment declined".to_string()));

    let draft = OrderDraft::from_cart_lines(&cart.lines(), address(), PaymentMethod::Upi);
    let err = orders.create(draft, &cart).await.expect_err("must fail");

    assert_eq!(err.to_string(), "payment declined");
    assert_eq!(cart.line_count(), 1);
    assert!(orders.orders().is_empty());
}

#[tokio::test]
async fn empty_draft_is_rejected_before_any_network_call() {
    let (gateway, cart, orders) = stores();

    let draft = OrderDraft::from_cart_lines(&[], address(), PaymentMethod::Cod);
    let err = orders.create(draft, &cart).await.expect_err("must fail");

    assert!(matches!(err, StoreError::InvalidDraft(_)));
    assert!(!gateway.calls().iter().any(|c| c == "create_order"));
}

#[tokio::test]
async fn order_lines_do_not_follow_catalog_changes() {
    let (_gateway, cart, orders) = stores();
    cart.add(&product("p-1", 200, 10)).await;

    let draft = OrderDraft::from_cart_lines(&cart.lines(), address(), PaymentMethod::Cod);
    let created = orders.create(draft, &cart).await.expect("create");

    // The catalog price changes afterwards; a new cart line sees the new
    // price, the frozen order line must not.
    cart.add(&product("p-1", 275, 10)).await;
    assert_eq!(cart.lines()[0].unit_price, Decimal::from(275));

    let stored = orders.get(&created.order_id).expect("order present");
    assert_eq!(stored.items[0].unit_price, Decimal::from(200));
    assert_eq!(stored.items[0].line_total, Decimal::from(200));
}

#[tokio::test]
async fn load_replaces_list_wholesale_and_sorts_newest_first() {
    let (gateway, _cart, orders) = stores();
    let older = order(
        OrderStatus::Delivered,
        Utc.with_ymd_and_hms(2026, 7, 1, 9, 0, 0).unwrap(),
    );
    let newer = order(
        OrderStatus::Pending,
        Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap(),
    );
    // Server returns oldest first; the client re-sorts.
    gateway.set_orders(vec![older.clone(), newer.clone()]);

    orders.load().await.expect("load");

    let list = orders.orders();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].order_id, newer.order_id);
    assert_eq!(list[1].order_id, older.order_id);
}

#[tokio::test]
async fn stale_response_never_overwrites_a_newer_one() {
    let (gateway, _cart, orders) = stores();
    let first_list = vec![order(OrderStatus::Pending, Utc::now())];
    let second_list = vec![
        order(OrderStatus::Pending, Utc::now()),
        order(OrderStatus::Confirmed, Utc::now()),
    ];
    // The first issued load answers slowly; the second answers immediately.
    gateway.script_orders(first_list, Duration::from_millis(80));
    gateway.script_orders(second_list.clone(), Duration::ZERO);

    let slow = {
        let orders = orders.clone();
        tokio::spawn(async move { orders.load().await })
    };
    // Make sure the slow load was issued (and claimed its script) first.
    tokio::time::sleep(Duration::from_millis(20)).await;
    orders.load().await.expect("fast load");
    slow.await.expect("join").expect("slow load");

    // The second (newer) request's data must win even though its response
    // arrived first.
    assert_eq!(orders.orders().len(), second_list.len());
    assert_eq!(gateway.fetch_orders_count(), 2);
}

#[tokio::test]
async fn failed_load_keeps_last_known_data_and_flags_the_error() {
    let (gateway, _cart, orders) = stores();
    gateway.set_orders(vec![order(OrderStatus::Pending, Utc::now())]);
    orders.load().await.expect("first load");

    gateway.script_orders_failure(ScriptedError::Remote("backend down".to_string()));
    let err = orders.load().await.expect_err("must fail");

    assert_eq!(err.to_string(), "backend down");
    assert_eq!(orders.orders().len(), 1);
    assert_eq!(orders.load_error().as_deref(), Some("backend down"));

    // A subsequent success clears the flag.
    orders.load().await.expect("recovery load");
    assert_eq!(orders.load_error(), None);
}

#[tokio::test]
async fn auth_required_load_enters_local_only_mode() {
    let (gateway, _cart, orders) = stores();
    gateway.set_orders(vec![order(OrderStatus::Preparing, Utc::now())]);
    orders.load().await.expect("first load");

    gateway.script_orders_failure(ScriptedError::AuthRequired);
    let err = orders.load().await.expect_err("must fail");

    assert!(matches!(err, StoreError::AuthRequired));
    assert!(orders.auth_required());
    // Cached data is kept for display.
    assert_eq!(orders.orders().len(), 1);
}

#[tokio::test]
async fn cancel_updates_the_order_in_place() {
    let (gateway, _cart, orders) = stores();
    let open = order(OrderStatus::Confirmed, Utc::now());
    gateway.set_orders(vec![open.clone()]);
    orders.load().await.expect("load");

    orders
        .cancel(&open.order_id, "changed my mind")
        .await
        .expect("cancel");

    let stored = orders.get(&open.order_id).expect("still present");
    assert_eq!(stored.order_status, OrderStatus::Cancelled);
    // Cancellation is a transition, not a removal.
    assert_eq!(orders.orders().len(), 1);
}

#[tokio::test]
async fn cancel_of_terminal_order_makes_no_network_call() {
    let (gateway, _cart, orders) = stores();
    let delivered = order(OrderStatus::Delivered, Utc::now());
    gateway.set_orders(vec![delivered.clone()]);
    orders.load().await.expect("load");

    let err = orders
        .cancel(&delivered.order_id, "too late")
        .await
        .expect_err("must fail");

    assert!(matches!(
        err,
        StoreError::AlreadyTerminal(OrderStatus::Delivered)
    ));
    assert!(!gateway.calls().iter().any(|c| c == "cancel_order"));
}

#[tokio::test]
async fn restore_hydrates_from_cache_until_first_live_load() {
    let gateway = MockGateway::new();
    let persist: Arc<dyn PersistenceAdapter> = Arc::new(MemoryStore::new());

    let first = OrderStore::new(Arc::new(gateway.clone()), persist.clone());
    gateway.set_orders(vec![order(OrderStatus::Pending, Utc::now())]);
    first.load().await.expect("load");

    // A fresh store over the same persistence sees the cached list without
    // any network call.
    let second = OrderStore::new(Arc::new(gateway.clone()), persist);
    let calls_before = gateway.fetch_orders_count();
    second.restore().await;
    assert_eq!(second.orders().len(), 1);
    assert_eq!(gateway.fetch_orders_count(), calls_before);
}
