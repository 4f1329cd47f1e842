// server/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use dishpatch::{OrderPlacement, Workflows};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub db_pool: PgPool,
  pub workflows: Arc<Workflows<AppError>>,
  pub placement: Arc<OrderPlacement>,
  pub config: Arc<AppConfig>,
}
