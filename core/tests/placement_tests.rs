// tests/placement_tests.rs
mod common;

use common::*;
use dishpatch::ordering::{FailPoint, MemoryStore, PlaceOrderError, PlacementConfig};
use serial_test::serial;
use std::collections::BTreeMap;

/// (item_id, quantity, price) of every line the store holds for `order_ids`.
fn lines_of(store: &MemoryStore, order_ids: &[i64]) -> Vec<(i64, i32, i64)> {
  let mut lines: Vec<_> = order_ids
    .iter()
    .flat_map(|id| store.order_lines(*id))
    .map(|l| (l.item_id, l.quantity, l.price))
    .collect();
  lines.sort();
  lines
}

#[tokio::test]
#[serial]
async fn test_two_restaurants_scenario() {
  setup_tracing();
  let store = menu_store();
  store.add_to_cart(USER, 1, 2);
  store.add_to_cart(USER, 2, 1);
  let placement = default_placement(&store);

  let receipt = placement.place_order(USER).await.unwrap();

  assert_eq!(receipt.orders.len(), 2);
  assert_eq!(receipt.orders[0].restaurant, "A");
  assert_eq!(receipt.orders[0].total_amount, 330_000);
  assert_eq!(receipt.orders[1].restaurant, "B");
  assert_eq!(receipt.orders[1].total_amount, 120_000);
  assert_eq!(receipt.grand_total(), 450_000);
  assert!(store.cart(USER).is_empty());

  let stored = store.orders();
  assert_eq!(stored.len(), 2);
  assert!(stored.iter().all(|o| o.user_id == USER));
  assert_eq!(receipt.order_ids(), stored.iter().map(|o| o.id).collect::<Vec<_>>());
  assert_eq!(lines_of(&store, &receipt.order_ids()), vec![(1, 2, 150_000), (2, 1, 90_000)]);
}

#[tokio::test]
#[serial]
async fn test_one_order_per_restaurant_and_lines_match_cart() {
  setup_tracing();
  let store = menu_store();
  store.add_to_cart(USER, 4, 1);
  store.add_to_cart(USER, 1, 1);
  store.add_to_cart(USER, 2, 3);
  store.add_to_cart(USER, 3, 2);
  let cart_before: Vec<(i64, i32, i64)> = {
    let prices = BTreeMap::from([(1, 150_000), (2, 90_000), (3, 45_000), (4, 20_000)]);
    let mut lines: Vec<_> = store.cart(USER).into_iter().map(|(id, q)| (id, q, prices[&id])).collect();
    lines.sort();
    lines
  };

  let receipt = default_placement(&store).place_order(USER).await.unwrap();

  let restaurants: Vec<_> = receipt.orders.iter().map(|o| o.restaurant.as_str()).collect();
  assert_eq!(restaurants, vec!["C", "A", "B"]);
  assert_eq!(receipt.orders.iter().map(|o| o.line_count).sum::<usize>(), 4);
  assert_eq!(lines_of(&store, &receipt.order_ids()), cart_before);

  for order in &receipt.orders {
    let subtotal: i64 = store
      .order_lines(order.order_id)
      .iter()
      .map(|l| l.price * i64::from(l.quantity))
      .sum();
    assert_eq!(order.total_amount, subtotal + SURCHARGE);
  }
}

#[tokio::test]
#[serial]
async fn test_custom_surcharge_is_applied_once_per_order() {
  setup_tracing();
  let store = menu_store();
  store.add_to_cart(USER, 1, 1);
  store.add_to_cart(USER, 3, 1);
  let placement = placement_for(
    &store,
    PlacementConfig {
      delivery_surcharge: 5_000,
      ..Default::default()
    },
  );

  let receipt = placement.place_order(USER).await.unwrap();
  assert_eq!(receipt.orders.len(), 1);
  assert_eq!(receipt.orders[0].total_amount, 150_000 + 45_000 + 5_000);
}

#[tokio::test]
#[serial]
async fn test_empty_cart_creates_nothing() {
  setup_tracing();
  let store = menu_store();
  store.add_to_cart(OTHER_USER, 1, 1);

  let err = default_placement(&store).place_order(USER).await.unwrap_err();

  assert!(matches!(err, PlaceOrderError::EmptyCart { user_id: USER }));
  assert!(err.is_user_correctable());
  assert_eq!(err.to_string(), "Cart is empty");
  assert!(store.orders().is_empty());
  assert_eq!(store.commits(), 0);
  assert_eq!(store.cart(OTHER_USER), vec![(1, 1)]);
}

#[tokio::test]
#[serial]
async fn test_lines_snapshot_price_at_placement() {
  setup_tracing();
  let store = menu_store();
  store.add_to_cart(USER, 2, 2);
  store.set_price(2, 100_000);

  let receipt = default_placement(&store).place_order(USER).await.unwrap();
  assert_eq!(receipt.orders[0].total_amount, 230_000);

  store.set_price(2, 1);
  let lines = store.order_lines(receipt.orders[0].order_id);
  assert_eq!(lines.len(), 1);
  assert_eq!(lines[0].price, 100_000);
}

#[tokio::test]
#[serial]
async fn test_failure_at_any_step_leaves_store_untouched() {
  setup_tracing();
  let failures = [
    FailPoint::FetchCart,
    FailPoint::CreateOrder { nth: 1 },
    FailPoint::CreateOrder { nth: 2 },
    FailPoint::CreateOrderLine,
    FailPoint::ClearCart,
    FailPoint::Commit,
  ];

  for point in failures {
    let store = menu_store();
    store.add_to_cart(USER, 1, 2);
    store.add_to_cart(USER, 2, 1);
    store.fail_on(point);
    let placement = default_placement(&store);

    let err = placement.place_order(USER).await.unwrap_err();
    assert!(matches!(err, PlaceOrderError::Store(_)), "{point:?}: unexpected {err:?}");
    assert!(!err.is_user_correctable());
    assert!(store.orders().is_empty(), "{point:?}: orders leaked");
    assert_eq!(store.cart(USER), vec![(1, 2), (2, 1)], "{point:?}: cart changed");

    store.clear_failures();
    let receipt = placement.place_order(USER).await.unwrap();
    assert_eq!(receipt.orders.len(), 2, "{point:?}: retry failed");
    assert!(store.cart(USER).is_empty());
  }
}

#[tokio::test]
#[serial]
async fn test_invalid_line_aborts_before_any_write() {
  setup_tracing();
  let store = menu_store();
  store.add_to_cart(USER, 1, 1);
  store.add_to_cart(USER, 2, 1);
  store.add_to_cart(USER, 2, -1);

  let err = default_placement(&store).place_order(USER).await.unwrap_err();

  assert!(matches!(err, PlaceOrderError::InvalidCartLine { item_id: 2, .. }));
  assert!(store.orders().is_empty());
  assert_eq!(store.cart(USER), vec![(1, 1), (2, 0)]);
}

#[tokio::test]
#[serial]
async fn test_overflowing_total_is_rejected() {
  setup_tracing();
  let store = MemoryStore::new();
  store.add_menu_item(1, i64::MAX / 2, "Pricey");
  store.add_to_cart(USER, 1, 3);

  let err = default_placement(&store).place_order(USER).await.unwrap_err();

  assert!(matches!(err, PlaceOrderError::AmountOverflow { ref restaurant } if restaurant == "Pricey"));
  assert!(store.orders().is_empty());
  assert_eq!(store.cart(USER), vec![(1, 3)]);
}

#[tokio::test]
#[serial]
async fn test_items_missing_from_menu_are_not_ordered() {
  setup_tracing();
  let store = menu_store();
  store.add_to_cart(USER, 99, 1);

  let err = default_placement(&store).place_order(USER).await.unwrap_err();
  assert!(matches!(err, PlaceOrderError::EmptyCart { .. }));
}

#[test]
fn test_pipeline_declares_steps_in_order() {
  let placement = default_placement(&MemoryStore::new());
  assert_eq!(
    placement.step_names(),
    vec![
      "begin_unit_of_work",
      "fetch_cart_with_prices",
      "partition_by_restaurant",
      "persist_orders",
      "clear_cart",
      "commit_unit_of_work",
    ]
  );
  assert_eq!(placement.config().delivery_surcharge, SURCHARGE);
  assert!(placement.config().timeout.is_none());
}
