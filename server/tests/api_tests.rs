// server/tests/api_tests.rs

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::{menu_store, status_and_body, test_config, test_state, USER};
use dishpatch::ordering::FailPoint;
use serde_json::{json, Value};
use std::time::Duration;

#[actix_web::test]
async fn health_reports_ok() {
  let app = init_app!(test_state(&menu_store(), test_config(&[])));

  let req = test::TestRequest::get().uri("/api/health").to_request();
  let (status, body) = status_and_body(test::call_service(&app, req).await).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "status": "ok" }));
}

#[actix_web::test]
async fn place_order_splits_cart_by_restaurant() {
  let store = menu_store();
  store.add_to_cart(USER, 1, 2);
  store.add_to_cart(USER, 2, 1);
  let app = init_app!(test_state(&store, test_config(&[])));

  let req = test::TestRequest::post()
    .uri("/api/order")
    .set_json(json!({ "user_id": USER }))
    .to_request();
  let (status, body) = status_and_body(test::call_service(&app, req).await).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["success"], true);
  assert_eq!(body["orders"].as_array().map(Vec::len), Some(2));

  let details = body["details"].as_array().cloned().unwrap_or_default();
  let totals: Vec<(String, i64)> = details
    .iter()
    .map(|d| (d["restaurant"].as_str().unwrap_or_default().to_string(), d["total_amount"].as_i64().unwrap_or(-1)))
    .collect();
  assert_eq!(totals, vec![("A".to_string(), 330_000), ("B".to_string(), 120_000)]);

  assert!(store.cart(USER).is_empty());
  assert_eq!(store.orders().len(), 2);
}

#[actix_web::test]
async fn place_order_honours_configured_surcharge() {
  let store = menu_store();
  store.add_to_cart(USER, 2, 1);
  let app = init_app!(test_state(&store, test_config(&[("DELIVERY_SURCHARGE", "0")])));

  let req = test::TestRequest::post()
    .uri("/api/order")
    .set_json(json!({ "user_id": USER }))
    .to_request();
  let (status, body) = status_and_body(test::call_service(&app, req).await).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["details"][0]["total_amount"], 90_000);
}

#[actix_web::test]
async fn empty_cart_is_reported_verbatim() {
  let store = menu_store();
  let app = init_app!(test_state(&store, test_config(&[])));

  let req = test::TestRequest::post()
    .uri("/api/order")
    .set_json(json!({ "user_id": USER }))
    .to_request();
  let (status, body) = status_and_body(test::call_service(&app, req).await).await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body, json!({ "success": false, "message": "Cart is empty" }));
  assert!(store.orders().is_empty());
}

#[actix_web::test]
async fn store_failure_is_generic_and_keeps_the_cart() {
  let store = menu_store();
  store.add_to_cart(USER, 1, 1);
  store.fail_on(FailPoint::CreateOrderLine);
  let app = init_app!(test_state(&store, test_config(&[])));

  let req = test::TestRequest::post()
    .uri("/api/order")
    .set_json(json!({ "user_id": USER }))
    .to_request();
  let (status, body) = status_and_body(test::call_service(&app, req).await).await;

  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["success"], false);
  assert_eq!(body["message"], "Order could not be placed.");
  assert_eq!(store.cart(USER), vec![(1, 1)]);
  assert!(store.orders().is_empty());
}

#[actix_web::test]
async fn slow_placement_times_out_with_503() {
  let store = menu_store().with_latency(Duration::from_millis(200));
  store.add_to_cart(USER, 1, 1);
  let app = init_app!(test_state(&store, test_config(&[("PLACE_ORDER_TIMEOUT_MS", "50")])));

  let req = test::TestRequest::post()
    .uri("/api/order")
    .set_json(json!({ "user_id": USER }))
    .to_request();
  let (status, body) = status_and_body(test::call_service(&app, req).await).await;

  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  assert_eq!(body["success"], false);
  assert!(store.orders().is_empty());
  assert_eq!(store.cart(USER), vec![(1, 1)]);
}

#[actix_web::test]
async fn register_rejects_mismatched_confirmation() {
  let app = init_app!(test_state(&menu_store(), test_config(&[])));

  let req = test::TestRequest::post()
    .uri("/api/register")
    .set_json(json!({
      "username": "lan",
      "email": "lan@example.com",
      "password": "secret1",
      "confirm_password": "secret2",
    }))
    .to_request();
  let (status, body) = status_and_body(test::call_service(&app, req).await).await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["success"], false);
  assert_eq!(body["message"], "Password confirmation does not match.");
}

#[actix_web::test]
async fn register_validates_email_and_password_length() {
  let app = init_app!(test_state(&menu_store(), test_config(&[])));

  for (email, password) in [("not-an-email", "secret1"), ("lan@example.com", "short")] {
    let req = test::TestRequest::post()
      .uri("/api/register")
      .set_json(json!({
        "username": "lan",
        "email": email,
        "password": password,
        "confirm_password": password,
      }))
      .to_request();
    let (status, body) = status_and_body(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "email={} password={}", email, password);
    assert_eq!(body["success"], false);
  }
}

#[actix_web::test]
async fn login_requires_both_fields() {
  let app = init_app!(test_state(&menu_store(), test_config(&[])));

  let req = test::TestRequest::post()
    .uri("/api/login")
    .set_json(json!({ "username": "lan", "password": "" }))
    .to_request();
  let (status, body) = status_and_body(test::call_service(&app, req).await).await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn cart_quantity_must_be_positive() {
  let app = init_app!(test_state(&menu_store(), test_config(&[])));

  let add = test::TestRequest::post()
    .uri("/api/cart")
    .set_json(json!({ "user_id": USER, "item_id": 1, "quantity": 0 }))
    .to_request();
  let (status, _) = status_and_body(test::call_service(&app, add).await).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let update = test::TestRequest::put()
    .uri("/api/cart/update")
    .set_json(json!({ "cart_id": 1, "quantity": -3 }))
    .to_request();
  let (status, body) = status_and_body(test::call_service(&app, update).await).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "Quantity must be at least 1.");
}

#[actix_web::test]
async fn menu_item_with_negative_price_is_rejected() {
  let app = init_app!(test_state(&menu_store(), test_config(&[])));

  let req = test::TestRequest::post()
    .uri("/api/menu")
    .set_json(json!({ "name": "Pho", "price": -1, "restaurant": "A" }))
    .to_request();
  let (status, body) = status_and_body(test::call_service(&app, req).await).await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn malformed_bodies_get_the_json_error_shape() {
  let app = init_app!(test_state(&menu_store(), test_config(&[])));

  let unknown_status = test::TestRequest::put()
    .uri("/api/orders/1/status")
    .set_json(json!({ "status": "shipped" }))
    .to_request();
  let (status, body) = status_and_body(test::call_service(&app, unknown_status).await).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["success"], false);

  let missing_user = test::TestRequest::post()
    .uri("/api/order")
    .set_json(json!({}))
    .to_request();
  let (status, body): (StatusCode, Value) = status_and_body(test::call_service(&app, missing_user).await).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn non_numeric_path_ids_are_bad_requests() {
  let app = init_app!(test_state(&menu_store(), test_config(&[])));

  let req = test::TestRequest::delete().uri("/api/cart/abc").to_request();
  let (status, body) = status_and_body(test::call_service(&app, req).await).await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["success"], false);
}
