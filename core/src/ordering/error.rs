// core/src/ordering/error.rs

use crate::error::FlowError;
use crate::ordering::model::{ItemId, UserId};
use crate::ordering::store::StoreError;
use thiserror::Error;

/// Why a placement produced no orders.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
  #[error("Cart is empty")]
  EmptyCart { user_id: UserId },

  #[error("Cart line for item {item_id} is invalid: {reason}")]
  InvalidCartLine { item_id: ItemId, reason: String },

  #[error("Order total for restaurant '{restaurant}' is out of range")]
  AmountOverflow { restaurant: String },

  #[error(transparent)]
  Store(#[from] StoreError),

  /// The deadline passed before the commit was issued; nothing was persisted.
  #[error("Order placement timed out")]
  TimedOut,

  #[error("Order placement workflow failed: {0}")]
  Workflow(#[from] FlowError),
}

impl PlaceOrderError {
  /// Errors the caller can fix by changing the cart; their message is safe
  /// to show as is.
  pub fn is_user_correctable(&self) -> bool {
    matches!(
      self,
      PlaceOrderError::EmptyCart { .. } | PlaceOrderError::InvalidCartLine { .. } | PlaceOrderError::AmountOverflow { .. }
    )
  }
}
