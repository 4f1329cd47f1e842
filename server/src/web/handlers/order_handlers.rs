// server/src/web/handlers/order_handlers.rs

use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::{Order, OrderItem, OrderStatus, RestaurantOrder};
use crate::pipelines::contexts::UpdateOrderStatusCtxData;
use crate::state::AppState;
use dishpatch::{ContextData, PipelineResult, PlacementReceipt};

#[derive(Deserialize, Debug)]
pub struct PlaceOrderRequestPayload {
  pub user_id: i64,
}

#[derive(Deserialize, Debug)]
pub struct UpdateOrderStatusRequestPayload {
  pub status: OrderStatus,
}

/// Response body of a successful placement.
pub fn receipt_json(receipt: &PlacementReceipt) -> Value {
  let details: Vec<Value> = receipt
    .orders
    .iter()
    .map(|order| {
      json!({
        "order_id": order.order_id,
        "restaurant": order.restaurant,
        "total_amount": order.total_amount,
        "line_count": order.line_count,
      })
    })
    .collect();

  json!({
    "success": true,
    "message": format!("Placed {} order(s).", receipt.orders.len()),
    "orders": receipt.order_ids(),
    "details": details,
  })
}

#[instrument(
    name = "handler::place_order",
    skip(app_state, req_payload),
    fields(user_id = req_payload.user_id)
)]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<PlaceOrderRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let receipt = app_state.placement.place_order(req_payload.user_id).await.map_err(|e| {
    warn!(error = %e, "Order placement failed.");
    AppError::from(e)
  })?;

  info!(
    orders = receipt.orders.len(),
    grand_total = receipt.grand_total(),
    "Order placement succeeded."
  );
  Ok(HttpResponse::Ok().json(receipt_json(&receipt)))
}

#[instrument(name = "handler::list_user_orders", skip(app_state))]
pub async fn list_user_orders_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let user_id = path.into_inner();
  let orders = sqlx::query_as::<_, Order>(
    "SELECT id, user_id, restaurant, total_amount, status, created_at \
     FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
  )
  .bind(user_id)
  .fetch_all(&app_state.db_pool)
  .await?;

  let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
  let lines = sqlx::query_as::<_, OrderItem>(
    "SELECT oi.id, oi.order_id, oi.item_id, m.name, oi.quantity, oi.price \
     FROM order_items oi JOIN menu_items m ON m.id = oi.item_id \
     WHERE oi.order_id = ANY($1) ORDER BY oi.id",
  )
  .bind(&order_ids)
  .fetch_all(&app_state.db_pool)
  .await?;

  let mut lines_by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
  for line in lines {
    lines_by_order.entry(line.order_id).or_default().push(line);
  }

  let orders: Vec<Value> = orders
    .into_iter()
    .map(|order| {
      let items = lines_by_order.remove(&order.id).unwrap_or_default();
      json!({
        "id": order.id,
        "restaurant": order.restaurant,
        "total_amount": order.total_amount,
        "status": order.status,
        "created_at": order.created_at,
        "items": items,
      })
    })
    .collect();

  Ok(HttpResponse::Ok().json(json!({ "success": true, "orders": orders })))
}

#[instrument(name = "handler::list_restaurant_orders", skip(app_state))]
pub async fn list_restaurant_orders_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let restaurant = path.into_inner();
  let orders = sqlx::query_as::<_, RestaurantOrder>(
    "SELECT o.id, u.username, o.total_amount, o.status, o.created_at \
     FROM orders o JOIN users u ON u.id = o.user_id \
     WHERE o.restaurant = $1 ORDER BY o.created_at DESC, o.id DESC",
  )
  .bind(&restaurant)
  .fetch_all(&app_state.db_pool)
  .await?;

  Ok(HttpResponse::Ok().json(json!({ "success": true, "orders": orders })))
}

#[instrument(
    name = "handler::update_order_status",
    skip(app_state, req_payload),
    fields(status = req_payload.status.as_str())
)]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  req_payload: web::Json<UpdateOrderStatusRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let ctx_data = ContextData::new(UpdateOrderStatusCtxData {
    app_state: app_state.get_ref().clone(),
    order_id,
    requested_status: req_payload.status,
    current_status: None,
  });

  match app_state.workflows.run(ctx_data).await? {
    PipelineResult::Completed => Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "message": "Order status updated.",
      "order_id": order_id,
      "status": req_payload.status,
    }))),
    PipelineResult::Stopped => Err(AppError::PipelineHaltedByHandler),
  }
}
