// server/src/pipelines/contexts.rs

//! Context data of the request pipelines. Handlers receive these wrapped in
//! `dishpatch::ContextData`.

use crate::models::{CartItem, OrderStatus, PublicUser};
use crate::state::AppState;

#[derive(Clone)]
pub struct RegisterCtxData {
  pub app_state: AppState,
  pub username: String,
  pub email: String,
  pub password: String,
  pub confirm_password: String,
  pub created_user_id: Option<i64>,
}

#[derive(Clone)]
pub struct LoginCtxData {
  pub app_state: AppState,
  pub username: String,
  pub password: String,
  /// Set once the user row is found; consumed by password verification.
  pub candidate_user: Option<(PublicUser, String)>,
  pub authenticated_user: Option<PublicUser>,
}

#[derive(Clone)]
pub struct AddToCartCtxData {
  pub app_state: AppState,
  pub user_id: i64,
  pub item_id: i64,
  pub quantity: i32,
  pub updated_cart_item: Option<CartItem>,
}

#[derive(Clone)]
pub struct UpdateOrderStatusCtxData {
  pub app_state: AppState,
  pub order_id: i64,
  pub requested_status: OrderStatus,
  pub current_status: Option<OrderStatus>,
}
