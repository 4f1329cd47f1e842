// core/src/ordering/store.rs

//! Persistence seams of order placement.
//!
//! A placement runs against one [`UnitOfWork`]: the cart read, every order and
//! order-line write, and the cart clear either all commit or none do.
//! Implementations must roll back when a unit is dropped without `commit`.

use crate::ordering::model::{CartLineId, ItemId, OrderId, PricedCartLine, UserId};
use async_trait::async_trait;
use thiserror::Error;

/// A persistence failure, tagged with the store operation that raised it.
#[derive(Debug, Error)]
#[error("store operation '{operation}' failed: {source}")]
pub struct StoreError {
  pub operation: &'static str,
  #[source]
  pub source: anyhow::Error,
}

impl StoreError {
  pub fn new(operation: &'static str, source: impl Into<anyhow::Error>) -> Self {
    Self {
      operation,
      source: source.into(),
    }
  }
}

#[async_trait]
pub trait CartStore: Send {
  /// The user's cart joined with current price and restaurant, in insertion
  /// order. The returned rows stay locked against concurrent placements
  /// until the unit ends.
  async fn fetch_cart_with_prices(&mut self, user_id: UserId) -> Result<Vec<PricedCartLine>, StoreError>;

  /// Removes the given lines of the user's cart. Lines added after the
  /// fetch are not among `line_ids` and survive.
  async fn clear_cart(&mut self, user_id: UserId, line_ids: &[CartLineId]) -> Result<(), StoreError>;
}

#[async_trait]
pub trait OrderStore: Send {
  /// Creates a `pending` order and returns its store-assigned id.
  async fn create_order(&mut self, user_id: UserId, restaurant: &str, total_amount: i64) -> Result<OrderId, StoreError>;

  async fn create_order_line(
    &mut self,
    order_id: OrderId,
    item_id: ItemId,
    quantity: i32,
    price: i64,
  ) -> Result<(), StoreError>;
}

/// Cart and order access bound to one atomic transaction.
#[async_trait]
pub trait UnitOfWork: CartStore + OrderStore + Send {
  async fn commit(self: Box<Self>) -> Result<(), StoreError>;

  async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// Opens units of work.
#[async_trait]
pub trait UnitOfWorkSource: Send + Sync {
  async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError>;
}
