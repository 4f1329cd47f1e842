// server/src/models/order_item.rs

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
  pub id: i64,
  pub order_id: i64,
  pub item_id: i64,
  pub name: String,
  pub quantity: i32,
  /// Unit price at the time the order was placed.
  pub price: i64,
}
