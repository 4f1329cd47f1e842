// server/src/models/menu_item.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MenuItem {
  pub id: i64,
  pub name: String,
  pub price: i64,
  pub restaurant: String,
  pub description: Option<String>,
  pub category: Option<String>,
  /// Minutes.
  pub delivery_time: Option<i32>,
  /// Kilometres.
  pub distance: Option<f64>,
  pub image: Option<String>,
}

/// Body of `POST /api/menu`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMenuItem {
  pub name: String,
  pub price: i64,
  pub restaurant: String,
  pub description: Option<String>,
  pub category: Option<String>,
  pub delivery_time: Option<i32>,
  pub distance: Option<f64>,
  pub image: Option<String>,
}
