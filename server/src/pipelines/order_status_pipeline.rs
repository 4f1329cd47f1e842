// server/src/pipelines/order_status_pipeline.rs

use crate::errors::AppError;
use crate::models::OrderStatus;
use crate::pipelines::contexts::UpdateOrderStatusCtxData;
use dishpatch::{ContextData, Pipeline, PipelineControl, Workflows};
use tracing::{info, warn};

pub fn register_order_status_pipeline(workflows: &Workflows<AppError>) {
  let mut p = Pipeline::<UpdateOrderStatusCtxData, AppError>::new(&[
    ("load_order_status", false, None),
    ("check_status_transition", false, None),
    ("apply_order_status", false, None),
  ]);

  p.on_root("load_order_status", |ctx_data: ContextData<UpdateOrderStatusCtxData>| {
    Box::pin(async move {
      let (order_id, db_pool) = {
        let guard = ctx_data.read();
        (guard.order_id, guard.app_state.db_pool.clone())
      };

      let status: Option<OrderStatus> = sqlx::query_scalar("SELECT status FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_optional(&db_pool)
        .await?;
      match status {
        Some(status) => {
          ctx_data.write().current_status = Some(status);
          Ok(PipelineControl::Continue)
        }
        None => Err(AppError::NotFound(format!("Order {} not found.", order_id))),
      }
    })
  });

  p.on_root("check_status_transition", |ctx_data: ContextData<UpdateOrderStatusCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      let current = guard
        .current_status
        .ok_or_else(|| AppError::Internal("Order status was not loaded.".to_string()))?;
      if !current.can_transition_to(guard.requested_status) {
        warn!(
          order_id = guard.order_id,
          from = current.as_str(),
          to = guard.requested_status.as_str(),
          "Order status change rejected."
        );
        return Err(AppError::Conflict(format!(
          "Order cannot move from '{}' to '{}'.",
          current.as_str(),
          guard.requested_status.as_str()
        )));
      }
      Ok(PipelineControl::Continue)
    })
  });

  // Conditional on the status read above, so a concurrent change is reported
  // instead of overwritten.
  p.on_root("apply_order_status", |ctx_data: ContextData<UpdateOrderStatusCtxData>| {
    Box::pin(async move {
      let (order_id, current, requested, db_pool) = {
        let guard = ctx_data.read();
        (
          guard.order_id,
          guard.current_status,
          guard.requested_status,
          guard.app_state.db_pool.clone(),
        )
      };

      let updated = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2 AND status = $3")
        .bind(requested)
        .bind(order_id)
        .bind(current)
        .execute(&db_pool)
        .await?
        .rows_affected();

      if updated == 0 {
        return Err(AppError::Conflict(format!(
          "Order {} changed status concurrently, please retry.",
          order_id
        )));
      }
      info!(order_id, status = requested.as_str(), "Order status updated.");
      Ok(PipelineControl::Continue)
    })
  });

  workflows.register_pipeline(p);
}
