// server/src/pipelines/mod.rs

//! Request pipelines, registered once in the application's `Workflows`
//! registry. Order placement has its own pipeline inside
//! `dishpatch::OrderPlacement`.

use crate::errors::AppError;
use dishpatch::Workflows;

pub mod contexts;

pub mod cart_pipeline;
pub mod login_pipeline;
pub mod order_status_pipeline;
pub mod register_pipeline;

/// Registers every request pipeline. Called once at start-up.
pub fn register_all_pipelines(workflows: &Workflows<AppError>) {
  register_pipeline::register_user_registration_pipeline(workflows);
  login_pipeline::register_login_pipeline(workflows);
  cart_pipeline::register_add_to_cart_pipeline(workflows);
  order_status_pipeline::register_order_status_pipeline(workflows);

  tracing::info!("All application pipelines registered.");
}
