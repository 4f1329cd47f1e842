// tests/common/mod.rs
#![allow(dead_code)]

use dishpatch::ordering::{MemoryStore, OrderPlacement, PlacementConfig};
use dishpatch::{ContextData, FlowError, PipelineControl};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::Level;

// --- Engine fixtures ---
#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub message: String,
  pub steps_executed: Vec<String>,
  pub should_stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  /// Engine errors kept as their Debug text so assertions can compare them.
  #[error("Workflow engine error: {0}")]
  Flow(String),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(e: FlowError) -> Self {
    TestError::Flow(format!("{e:?}"))
  }
}

pub fn create_simple_handler(
  step_name: &'static str,
  message_to_append: &'static str,
) -> dishpatch::Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.message.push_str(message_to_append);
      guard.steps_executed.push(step_name.to_string());
      tracing::debug!(target: "test_handlers", step = step_name, counter = guard.counter, "executed");
      if guard.should_stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn create_failing_handler(
  step_name: &'static str,
  error_message: &'static str,
) -> dishpatch::Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      tracing::warn!(target: "test_handlers", step = step_name, "failing with: '{}'", error_message);
      Err(TestError::Handler(error_message.to_string()))
    })
  })
}

// --- Placement fixtures ---
pub const SURCHARGE: i64 = 30_000;

pub const USER: i64 = 1;
pub const OTHER_USER: i64 = 2;

/// Menu: items 1 and 3 from "A", item 2 from "B", item 4 from "C".
pub fn menu_store() -> MemoryStore {
  let store = MemoryStore::new();
  store.add_menu_item(1, 150_000, "A");
  store.add_menu_item(2, 90_000, "B");
  store.add_menu_item(3, 45_000, "A");
  store.add_menu_item(4, 20_000, "C");
  store
}

pub fn placement_for(store: &MemoryStore, config: PlacementConfig) -> OrderPlacement {
  OrderPlacement::new(Arc::new(store.clone()), config)
}

pub fn default_placement(store: &MemoryStore) -> OrderPlacement {
  placement_for(store, PlacementConfig::default())
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
