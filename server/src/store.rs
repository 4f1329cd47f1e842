// server/src/store.rs

//! PostgreSQL units of work for order placement.
//!
//! One unit is one transaction. The cart read takes row locks (`FOR UPDATE`)
//! on the user's cart lines, so a second placement for the same user, from
//! this process or another, waits until the first commits and then finds the
//! cart empty. Rows inserted after the read are not locked, so the clear
//! deletes the read rows by id and leaves those alone. Dropping a unit
//! without committing rolls the transaction back.

use async_trait::async_trait;
use dishpatch::ordering::{
  CartLineId, CartStore, ItemId, OrderId, OrderStore, PricedCartLine, StoreError, UnitOfWork, UnitOfWorkSource, UserId,
};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{event, Level};

#[derive(Clone)]
pub struct PgUnitOfWorkSource {
  pool: PgPool,
}

impl PgUnitOfWorkSource {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl UnitOfWorkSource for PgUnitOfWorkSource {
  async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
    let tx = self.pool.begin().await.map_err(|e| StoreError::new("begin", e))?;
    Ok(Box::new(PgUnitOfWork { tx }))
  }
}

pub struct PgUnitOfWork {
  tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CartStore for PgUnitOfWork {
  async fn fetch_cart_with_prices(&mut self, user_id: UserId) -> Result<Vec<PricedCartLine>, StoreError> {
    let rows: Vec<(i64, i64, i32, i64, String)> = sqlx::query_as(
      "SELECT c.id, c.item_id, c.quantity, m.price, m.restaurant \
       FROM cart c JOIN menu_items m ON m.id = c.item_id \
       WHERE c.user_id = $1 \
       ORDER BY c.id \
       FOR UPDATE OF c",
    )
    .bind(user_id)
    .fetch_all(&mut *self.tx)
    .await
    .map_err(|e| StoreError::new("fetch_cart_with_prices", e))?;

    Ok(
      rows
        .into_iter()
        .map(|(cart_line_id, item_id, quantity, price, restaurant)| PricedCartLine {
          cart_line_id,
          item_id,
          quantity,
          price,
          restaurant,
        })
        .collect(),
    )
  }

  async fn clear_cart(&mut self, user_id: UserId, line_ids: &[CartLineId]) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM cart WHERE user_id = $1 AND id = ANY($2)")
      .bind(user_id)
      .bind(line_ids)
      .execute(&mut *self.tx)
      .await
      .map_err(|e| StoreError::new("clear_cart", e))?;
    event!(Level::DEBUG, user_id, rows = result.rows_affected(), "Cart cleared.");
    Ok(())
  }
}

#[async_trait]
impl OrderStore for PgUnitOfWork {
  async fn create_order(&mut self, user_id: UserId, restaurant: &str, total_amount: i64) -> Result<OrderId, StoreError> {
    sqlx::query_scalar::<_, i64>(
      "INSERT INTO orders (user_id, restaurant, total_amount, status) VALUES ($1, $2, $3, 'pending') RETURNING id",
    )
    .bind(user_id)
    .bind(restaurant)
    .bind(total_amount)
    .fetch_one(&mut *self.tx)
    .await
    .map_err(|e| StoreError::new("create_order", e))
  }

  async fn create_order_line(
    &mut self,
    order_id: OrderId,
    item_id: ItemId,
    quantity: i32,
    price: i64,
  ) -> Result<(), StoreError> {
    sqlx::query("INSERT INTO order_items (order_id, item_id, quantity, price) VALUES ($1, $2, $3, $4)")
      .bind(order_id)
      .bind(item_id)
      .bind(quantity)
      .bind(price)
      .execute(&mut *self.tx)
      .await
      .map_err(|e| StoreError::new("create_order_line", e))?;
    Ok(())
  }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
  async fn commit(self: Box<Self>) -> Result<(), StoreError> {
    self.tx.commit().await.map_err(|e| StoreError::new("commit", e))
  }

  async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
    self.tx.rollback().await.map_err(|e| StoreError::new("rollback", e))
  }
}
