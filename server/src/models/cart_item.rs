// server/src/models/cart_item.rs

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartItem {
  pub id: i64,
  pub user_id: i64,
  pub item_id: i64,
  pub quantity: i32,
}

/// A cart row joined with the menu item it points at.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartItemView {
  pub id: i64,
  pub item_id: i64,
  pub quantity: i32,
  pub name: String,
  pub price: i64,
  pub image: Option<String>,
  pub restaurant: String,
}
