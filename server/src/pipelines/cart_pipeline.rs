// server/src/pipelines/cart_pipeline.rs

use crate::errors::AppError;
use crate::models::CartItem;
use crate::pipelines::contexts::AddToCartCtxData;
use dishpatch::{ContextData, Pipeline, PipelineControl, Workflows};
use tracing::{error, info, warn};

pub fn register_add_to_cart_pipeline(workflows: &Workflows<AppError>) {
  let mut p = Pipeline::<AddToCartCtxData, AppError>::new(&[
    ("validate_cart_input", false, None),
    ("ensure_menu_item_exists", false, None),
    ("upsert_cart_item", false, None),
  ]);

  p.on_root("validate_cart_input", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let quantity = ctx_data.read().quantity;
      if quantity < 1 {
        warn!(quantity, "Add to cart rejected: quantity must be at least 1.");
        return Err(AppError::Validation("Quantity must be at least 1.".to_string()));
      }
      Ok(PipelineControl::Continue)
    })
  });

  p.on_root("ensure_menu_item_exists", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (item_id, db_pool) = {
        let guard = ctx_data.read();
        (guard.item_id, guard.app_state.db_pool.clone())
      };

      let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM menu_items WHERE id = $1)")
        .bind(item_id)
        .fetch_one(&db_pool)
        .await?;
      if !exists {
        warn!(item_id, "Add to cart rejected: unknown menu item.");
        return Err(AppError::NotFound(format!("Menu item {} not found.", item_id)));
      }
      Ok(PipelineControl::Continue)
    })
  });

  // Adds to an existing line instead of replacing its quantity.
  p.on_root("upsert_cart_item", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (user_id, item_id, quantity, db_pool) = {
        let guard = ctx_data.read();
        (guard.user_id, guard.item_id, guard.quantity, guard.app_state.db_pool.clone())
      };

      let result = sqlx::query_as::<_, CartItem>(
        "INSERT INTO cart (user_id, item_id, quantity) VALUES ($1, $2, $3) \
         ON CONFLICT (user_id, item_id) DO UPDATE SET quantity = cart.quantity + EXCLUDED.quantity \
         RETURNING id, user_id, item_id, quantity",
      )
      .bind(user_id)
      .bind(item_id)
      .bind(quantity)
      .fetch_one(&db_pool)
      .await;

      match result {
        Ok(cart_item) => {
          info!(
            user_id,
            item_id,
            cart_id = cart_item.id,
            quantity = cart_item.quantity,
            "Cart line added or updated."
          );
          ctx_data.write().updated_cart_item = Some(cart_item);
          Ok(PipelineControl::Continue)
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
          Err(AppError::NotFound(format!("User {} not found.", user_id)))
        }
        Err(e) => {
          error!(user_id, item_id, error = %e, "DB error adding cart item.");
          Err(AppError::Sqlx(e))
        }
      }
    })
  });

  workflows.register_pipeline(p);
}
