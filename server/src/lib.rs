// server/src/lib.rs

//! HTTP service for the food-ordering backend: accounts, menu, carts and
//! order placement over PostgreSQL.

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::state::AppState;
use dishpatch::{OrderPlacement, UnitOfWorkSource, Workflows};
use sqlx::PgPool;
use std::sync::Arc;

/// Wires the shared state: registers the request pipelines and builds the
/// order placement service over `placement_source`.
pub fn build_app_state(db_pool: PgPool, placement_source: Arc<dyn UnitOfWorkSource>, config: AppConfig) -> AppState {
  let workflows = Arc::new(Workflows::<AppError>::new());
  pipelines::register_all_pipelines(&workflows);

  let placement = Arc::new(OrderPlacement::new(placement_source, config.placement_config()));

  AppState {
    db_pool,
    workflows,
    placement,
    config: Arc::new(config),
  }
}
