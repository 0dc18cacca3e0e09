//! Integration tests for the full store: cross-component flows and the
//! concurrency guarantees that single-module tests cannot exercise.

use std::sync::Arc;
use std::thread;

use storefront_core::{Money, StoreError};
use storefront_orders::{OrderStatus, PaymentMethod};

use crate::orders::OrderItemSpec;
use crate::tables::Store;

fn init_tracing() {
    storefront_observability::init();
}

/// Seed: one user with profile + two addresses, two products, one warehouse.
struct Fixture {
    store: Store,
    user_id: storefront_identity::UserId,
    laptop: storefront_catalog::ProductId,
    mouse: storefront_catalog::ProductId,
    warehouse: storefront_inventory::WarehouseId,
}

fn fixture() -> Fixture {
    init_tracing();
    let store = Store::new();

    let user = store.create_user("ada@example.com", "hash").unwrap();
    store
        .upsert_profile(user.id_typed(), "Ada", "Lovelace", None, None, None)
        .unwrap();
    store
        .add_address(user.id_typed(), "1 First St", "Springfield", None, "62701", "US")
        .unwrap();
    store
        .add_address(user.id_typed(), "2 Second St", "Springfield", None, "62702", "US")
        .unwrap();

    let laptop = store
        .create_product("LAP-001", "Laptop", None, Money::from_cents(75_000), 1_800, None)
        .unwrap();
    let mouse = store
        .create_product("MOU-003", "Mouse", None, Money::from_cents(5_500), 90, None)
        .unwrap();
    let warehouse = store.create_warehouse("Central", "Lyon", "FR").unwrap();

    Fixture {
        user_id: user.id_typed(),
        laptop: laptop.id_typed(),
        mouse: mouse.id_typed(),
        warehouse: warehouse.id_typed(),
        store,
    }
}

#[test]
fn stock_across_warehouses_matches_the_row_sum_including_zero() {
    let f = fixture();
    let north = f.store.create_warehouse("North", "Lille", "FR").unwrap();

    assert_eq!(f.store.stock_across_warehouses(f.laptop).unwrap(), 0);

    f.store.adjust_stock(f.laptop, f.warehouse, 30).unwrap();
    f.store.adjust_stock(f.laptop, north.id_typed(), 12).unwrap();

    assert_eq!(f.store.stock_across_warehouses(f.laptop).unwrap(), 42);
    // The other product still aggregates to zero.
    assert_eq!(f.store.stock_across_warehouses(f.mouse).unwrap(), 0);
}

#[test]
fn line_totals_recompute_from_quantity_and_unit_price() {
    let f = fixture();
    let order = f
        .store
        .create_order(
            f.user_id,
            &[
                OrderItemSpec { product_id: f.laptop, quantity: 2 },
                OrderItemSpec { product_id: f.mouse, quantity: 3 },
            ],
            None,
            None,
            "USD",
        )
        .unwrap();

    for item in order.items() {
        assert_eq!(
            item.line_total().cents(),
            item.unit_price().cents() * item.quantity() as u64
        );
    }
}

#[test]
fn deleting_a_user_removes_profile_and_both_addresses_atomically() {
    let f = fixture();
    assert_eq!(f.store.list_addresses(f.user_id).unwrap().len(), 2);

    f.store.delete_user(f.user_id).unwrap();

    assert!(matches!(
        f.store.get_user(f.user_id),
        Err(StoreError::NotFound { entity: "user" })
    ));
    assert!(matches!(
        f.store.get_profile(f.user_id),
        Err(StoreError::NotFound { .. })
    ));
    let tables = f.store.read().unwrap();
    assert!(tables.addresses.values().all(|a| a.user_id() != f.user_id));
}

#[test]
fn ordered_products_cannot_be_deleted_and_stay_unchanged() {
    let f = fixture();
    let order = f
        .store
        .create_order(
            f.user_id,
            &[OrderItemSpec { product_id: f.laptop, quantity: 1 }],
            None,
            None,
            "USD",
        )
        .unwrap();

    let err = f.store.delete_product(f.laptop).unwrap_err();
    match err {
        StoreError::ReferencedByOrder { entity: "product" } => {}
        _ => panic!("Expected ReferencedByOrder"),
    }

    // Product and order item both survive, unchanged.
    let product = f.store.get_product(f.laptop).unwrap();
    assert_eq!(product.sku(), "LAP-001");
    let order = f.store.get_order(order.id_typed()).unwrap();
    assert_eq!(order.items().len(), 1);
    assert_eq!(order.items()[0].product_id(), f.laptop);
}

#[test]
fn order_totals_add_up_to_the_cent() {
    let f = fixture();
    let order = f
        .store
        .create_order(
            f.user_id,
            &[
                OrderItemSpec { product_id: f.laptop, quantity: 1 },
                OrderItemSpec { product_id: f.mouse, quantity: 1 },
            ],
            None,
            None,
            "USD",
        )
        .unwrap();

    assert_eq!(order.total(), Money::from_cents(80_500));
    assert_eq!(order.total().to_string(), "805.00");
}

#[test]
fn concurrent_decrements_serialize_and_never_go_negative() {
    let f = fixture();
    f.store.adjust_stock(f.laptop, f.warehouse, 50).unwrap();

    let store = Arc::new(f.store);
    let mut handles = Vec::new();
    for _ in 0..2 {
        let store = store.clone();
        let product_id = f.laptop;
        let warehouse_id = f.warehouse;
        handles.push(thread::spawn(move || {
            store.adjust_stock(product_id, warehouse_id, -30)
        }));
    }

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .collect();

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1, "exactly one decrement must win");
    let failure = results.into_iter().find(Result::is_err).unwrap().unwrap_err();
    match failure {
        StoreError::InsufficientStock { on_hand: 20, requested: -30 } => {}
        other => panic!("Expected InsufficientStock after the winning decrement, got {other:?}"),
    }

    assert_eq!(store.stock_on_hand(f.laptop, f.warehouse).unwrap(), 20);
}

#[test]
fn category_reparent_cycles_are_rejected() {
    let f = fixture();
    let electronics = f.store.create_category("Electronics", "electronics", None).unwrap();
    let computers = f
        .store
        .create_category("Computers", "computers", Some(electronics.id_typed()))
        .unwrap();
    let laptops = f
        .store
        .create_category("Laptops", "laptops", Some(computers.id_typed()))
        .unwrap();

    let err = f
        .store
        .set_category_parent(electronics.id_typed(), Some(laptops.id_typed()))
        .unwrap_err();
    match err {
        StoreError::CycleDetected(_) => {}
        _ => panic!("Expected CycleDetected"),
    }
}

#[test]
fn a_full_shop_round_trip_holds_together() {
    let f = fixture();

    // Catalog taxonomy.
    let category = f.store.create_category("Electronics", "electronics", None).unwrap();
    f.store.attach_category(f.laptop, category.id_typed()).unwrap();
    f.store.attach_category(f.mouse, category.id_typed()).unwrap();

    // Stock arrives.
    f.store.adjust_stock(f.laptop, f.warehouse, 10).unwrap();
    f.store.adjust_stock(f.mouse, f.warehouse, 100).unwrap();

    // Checkout: order, payment, fulfilment.
    let addresses = f.store.list_addresses(f.user_id).unwrap();
    let order = f
        .store
        .create_order(
            f.user_id,
            &[
                OrderItemSpec { product_id: f.laptop, quantity: 1 },
                OrderItemSpec { product_id: f.mouse, quantity: 2 },
            ],
            Some(addresses[0].id_typed()),
            Some(addresses[0].id_typed()),
            "USD",
        )
        .unwrap();
    assert_eq!(order.total(), Money::from_cents(86_000));

    f.store
        .add_payment(order.id_typed(), order.total(), PaymentMethod::Card, Some("ch_1"))
        .unwrap();
    f.store.transition_order(order.id_typed(), OrderStatus::Paid).unwrap();
    f.store.transition_order(order.id_typed(), OrderStatus::Shipped).unwrap();
    f.store.transition_order(order.id_typed(), OrderStatus::Delivered).unwrap();

    // Shipment consumes stock (the external workflow drives this).
    f.store.adjust_stock(f.laptop, f.warehouse, -1).unwrap();
    f.store.adjust_stock(f.mouse, f.warehouse, -2).unwrap();

    // Feedback.
    f.store
        .add_review(f.laptop, Some(f.user_id), 5, "Quick machine", None)
        .unwrap();

    // The derived view reflects all of it.
    let view = f.store.stock_view().unwrap();
    assert_eq!(view.len(), 2);
    assert_eq!(view[0].sku, "LAP-001");
    assert_eq!(view[0].total_quantity, 9);
    assert_eq!(view[1].sku, "MOU-003");
    assert_eq!(view[1].total_quantity, 98);

    // The user now has order history, so account deletion is blocked.
    assert!(matches!(
        f.store.delete_user(f.user_id),
        Err(StoreError::ReferencedByOrder { entity: "user" })
    ));

    // A delivered order takes no further payments.
    assert!(matches!(
        f.store
            .add_payment(order.id_typed(), Money::from_cents(1), PaymentMethod::Card, None),
        Err(StoreError::OrderNotPayable(_))
    ));
}

#[test]
fn failed_multi_row_operations_leave_no_partial_state() {
    let f = fixture();

    // An order with one valid and one unknown product must commit nothing.
    let ghost = storefront_catalog::ProductId::new(storefront_core::RecordId::new());
    let err = f
        .store
        .create_order(
            f.user_id,
            &[
                OrderItemSpec { product_id: f.laptop, quantity: 1 },
                OrderItemSpec { product_id: ghost, quantity: 1 },
            ],
            None,
            None,
            "USD",
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "product" }));
    assert!(f.store.list_orders_for_user(f.user_id).unwrap().is_empty());

    // The order-number sequence must not have burned a number either: the
    // next successful order starts at one.
    let order = f
        .store
        .create_order(
            f.user_id,
            &[OrderItemSpec { product_id: f.laptop, quantity: 1 }],
            None,
            None,
            "USD",
        )
        .unwrap();
    assert_eq!(order.order_number(), "ORD-00000001");
}
