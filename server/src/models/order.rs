// server/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Confirmed,
  Cancelled,
}

impl OrderStatus {
  /// pending → confirmed, pending → cancelled, confirmed → cancelled.
  pub fn can_transition_to(self, next: OrderStatus) -> bool {
    matches!(
      (self, next),
      (OrderStatus::Pending, OrderStatus::Confirmed)
        | (OrderStatus::Pending, OrderStatus::Cancelled)
        | (OrderStatus::Confirmed, OrderStatus::Cancelled)
    )
  }

  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Confirmed => "confirmed",
      OrderStatus::Cancelled => "cancelled",
    }
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: i64,
  pub user_id: i64,
  pub restaurant: String,
  pub total_amount: i64,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
}

/// An order as a restaurant sees it, with the customer's username.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RestaurantOrder {
  pub id: i64,
  pub username: String,
  pub total_amount: i64,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
}
