// server/src/web/handlers/menu_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::{MenuItem, NewMenuItem};
use crate::state::AppState;

#[instrument(name = "handler::list_menu", skip(app_state))]
pub async fn list_menu_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let items = sqlx::query_as::<_, MenuItem>(
    "SELECT id, name, price, restaurant, description, category, delivery_time, distance, image \
     FROM menu_items ORDER BY id",
  )
  .fetch_all(&app_state.db_pool)
  .await?;

  Ok(HttpResponse::Ok().json(json!({ "success": true, "items": items })))
}

fn validate_new_menu_item(item: &NewMenuItem) -> Result<(), AppError> {
  if item.name.trim().is_empty() {
    return Err(AppError::Validation("Item name is required.".to_string()));
  }
  if item.restaurant.trim().is_empty() {
    return Err(AppError::Validation("Restaurant is required.".to_string()));
  }
  if item.price < 0 {
    return Err(AppError::Validation("Price must not be negative.".to_string()));
  }
  if item.delivery_time.is_some_and(|minutes| minutes < 0) {
    return Err(AppError::Validation("Delivery time must not be negative.".to_string()));
  }
  if item.distance.is_some_and(|km| !km.is_finite() || km < 0.0) {
    return Err(AppError::Validation("Distance must be a non-negative number.".to_string()));
  }
  Ok(())
}

#[instrument(
    name = "handler::create_menu_item",
    skip(app_state, req_payload),
    fields(restaurant = %req_payload.restaurant)
)]
pub async fn create_menu_item_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<NewMenuItem>,
) -> Result<HttpResponse, AppError> {
  let item = req_payload.into_inner();
  validate_new_menu_item(&item)?;

  let id: i64 = sqlx::query_scalar(
    "INSERT INTO menu_items (name, price, restaurant, description, category, delivery_time, distance, image) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
  )
  .bind(item.name.trim())
  .bind(item.price)
  .bind(item.restaurant.trim())
  .bind(&item.description)
  .bind(&item.category)
  .bind(item.delivery_time)
  .bind(item.distance)
  .bind(&item.image)
  .fetch_one(&app_state.db_pool)
  .await?;

  info!(item_id = id, "Menu item created.");
  Ok(HttpResponse::Created().json(json!({
    "success": true,
    "message": "Menu item created.",
    "id": id,
  })))
}
