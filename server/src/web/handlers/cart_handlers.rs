// server/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::CartItemView;
use crate::pipelines::contexts::AddToCartCtxData;
use crate::state::AppState;
use dishpatch::{ContextData, PipelineResult};

fn default_quantity() -> i32 {
  1
}

#[derive(Deserialize, Debug)]
pub struct AddToCartRequestPayload {
  pub user_id: i64,
  pub item_id: i64,
  #[serde(default = "default_quantity")]
  pub quantity: i32,
}

#[derive(Deserialize, Debug)]
pub struct UpdateCartRequestPayload {
  pub cart_id: i64,
  pub quantity: i32,
}

#[instrument(
    name = "handler::add_to_cart",
    skip(app_state, req_payload),
    fields(user_id = req_payload.user_id, item_id = req_payload.item_id, quantity = req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let ctx_data = ContextData::new(AddToCartCtxData {
    app_state: app_state.get_ref().clone(),
    user_id: req_payload.user_id,
    item_id: req_payload.item_id,
    quantity: req_payload.quantity,
    updated_cart_item: None,
  });

  match app_state.workflows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let cart_item = ctx_data.read().updated_cart_item.clone().ok_or_else(|| {
        warn!("Add to cart pipeline completed without a cart line.");
        AppError::Internal("Cart update completed, but the cart line is unavailable.".to_string())
      })?;
      Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Item added to cart.",
        "cart_item": cart_item,
      })))
    }
    PipelineResult::Stopped => Err(AppError::PipelineHaltedByHandler),
  }
}

#[instrument(name = "handler::get_cart", skip(app_state))]
pub async fn get_cart_handler(app_state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
  let user_id = path.into_inner();
  let items = sqlx::query_as::<_, CartItemView>(
    "SELECT c.id, c.item_id, c.quantity, m.name, m.price, m.image, m.restaurant \
     FROM cart c JOIN menu_items m ON m.id = c.item_id \
     WHERE c.user_id = $1 ORDER BY c.id",
  )
  .bind(user_id)
  .fetch_all(&app_state.db_pool)
  .await?;

  Ok(HttpResponse::Ok().json(json!({ "success": true, "items": items })))
}

#[instrument(
    name = "handler::update_cart_item",
    skip(app_state, req_payload),
    fields(cart_id = req_payload.cart_id, quantity = req_payload.quantity)
)]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<UpdateCartRequestPayload>,
) -> Result<HttpResponse, AppError> {
  if req_payload.quantity < 1 {
    return Err(AppError::Validation("Quantity must be at least 1.".to_string()));
  }

  let updated = sqlx::query("UPDATE cart SET quantity = $1 WHERE id = $2")
    .bind(req_payload.quantity)
    .bind(req_payload.cart_id)
    .execute(&app_state.db_pool)
    .await?
    .rows_affected();
  if updated == 0 {
    return Err(AppError::NotFound(format!("Cart line {} not found.", req_payload.cart_id)));
  }

  info!("Cart line quantity updated.");
  Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Cart updated." })))
}

#[instrument(name = "handler::remove_cart_item", skip(app_state))]
pub async fn remove_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let cart_id = path.into_inner();
  let deleted = sqlx::query("DELETE FROM cart WHERE id = $1")
    .bind(cart_id)
    .execute(&app_state.db_pool)
    .await?
    .rows_affected();
  if deleted == 0 {
    return Err(AppError::NotFound(format!("Cart line {} not found.", cart_id)));
  }

  info!(cart_id, "Cart line removed.");
  Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Item removed from cart." })))
}
