// core/src/ordering/placement.rs

//! The order placement workflow.
//!
//! `OrderPlacement::place_order` serializes on the user, opens one unit of
//! work and runs a six-step pipeline over it:
//!
//! 1. `begin_unit_of_work`
//! 2. `fetch_cart_with_prices`
//! 3. `partition_by_restaurant`
//! 4. `persist_orders`
//! 5. `clear_cart`
//! 6. `commit_unit_of_work`
//!
//! Any error, a `Stop`, or the deadline elapsing rolls the unit back, so the
//! cart is either fully converted into orders or left as it was. Only the
//! cart lines read in step 2 are cleared. The deadline stops applying once
//! the commit has been issued: a commit that has started is always awaited.

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::error::FlowError;
use crate::ordering::error::PlaceOrderError;
use crate::ordering::locks::UserLocks;
use crate::ordering::model::{PlacedOrder, PlacementReceipt, PricedCartLine, RestaurantGroup, UserId};
use crate::ordering::partition::partition_by_restaurant;
use crate::ordering::store::{CartStore, OrderStore, UnitOfWork, UnitOfWorkSource};
use crate::pipeline::definition::Pipeline;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{event, instrument, Level};

pub const DEFAULT_DELIVERY_SURCHARGE: i64 = 30_000;

pub const STEP_BEGIN: &str = "begin_unit_of_work";
pub const STEP_FETCH_CART: &str = "fetch_cart_with_prices";
pub const STEP_PARTITION: &str = "partition_by_restaurant";
pub const STEP_PERSIST: &str = "persist_orders";
pub const STEP_CLEAR_CART: &str = "clear_cart";
pub const STEP_COMMIT: &str = "commit_unit_of_work";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementConfig {
  /// Flat fee added once to every restaurant's order.
  pub delivery_surcharge: i64,
  /// Upper bound on one placement, lock wait included. `None` waits forever.
  pub timeout: Option<Duration>,
}

impl Default for PlacementConfig {
  fn default() -> Self {
    Self {
      delivery_surcharge: DEFAULT_DELIVERY_SURCHARGE,
      timeout: None,
    }
  }
}

type UnitSlot = Arc<AsyncMutex<Option<Box<dyn UnitOfWork>>>>;

/// Context threaded through the placement pipeline.
pub struct PlaceOrderCtxData {
  pub user_id: UserId,
  pub delivery_surcharge: i64,
  pub source: Arc<dyn UnitOfWorkSource>,
  /// The open unit, present between `begin_unit_of_work` and
  /// `commit_unit_of_work`.
  pub unit: UnitSlot,
  pub lines: Vec<PricedCartLine>,
  pub groups: Vec<RestaurantGroup>,
  pub placed: Vec<PlacedOrder>,
  /// Set right before the commit is issued.
  pub committing: bool,
}

impl PlaceOrderCtxData {
  pub fn new(user_id: UserId, delivery_surcharge: i64, source: Arc<dyn UnitOfWorkSource>) -> Self {
    Self {
      user_id,
      delivery_surcharge,
      source,
      unit: Arc::new(AsyncMutex::new(None)),
      lines: Vec::new(),
      groups: Vec::new(),
      placed: Vec::new(),
      committing: false,
    }
  }
}

impl std::fmt::Debug for PlaceOrderCtxData {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PlaceOrderCtxData")
      .field("user_id", &self.user_id)
      .field("delivery_surcharge", &self.delivery_surcharge)
      .field("lines", &self.lines.len())
      .field("groups", &self.groups.len())
      .field("placed", &self.placed)
      .field("committing", &self.committing)
      .finish()
  }
}

fn unit_not_open(step: &str) -> PlaceOrderError {
  PlaceOrderError::Workflow(FlowError::Internal(format!("no open unit of work in step '{step}'")))
}

/// Builds the placement pipeline with all six steps wired.
pub fn build_place_order_pipeline() -> Pipeline<PlaceOrderCtxData, PlaceOrderError> {
  let mut pipeline = Pipeline::new(&[
    (STEP_BEGIN, false, None),
    (STEP_FETCH_CART, false, None),
    (STEP_PARTITION, false, None),
    (STEP_PERSIST, false, None),
    (STEP_CLEAR_CART, false, None),
    (STEP_COMMIT, false, None),
  ]);

  pipeline.on_root(STEP_BEGIN, begin_unit_of_work);
  pipeline.on_root(STEP_FETCH_CART, fetch_cart_with_prices);
  pipeline.on_root(STEP_PARTITION, partition_cart);
  pipeline.on_root(STEP_PERSIST, persist_orders);
  pipeline.on_root(STEP_CLEAR_CART, clear_cart);
  pipeline.on_root(STEP_COMMIT, commit_unit_of_work);
  pipeline
}

async fn begin_unit_of_work(ctx: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, PlaceOrderError> {
  let (source, slot) = {
    let data = ctx.read();
    (data.source.clone(), data.unit.clone())
  };
  let unit = source.begin().await?;
  *slot.lock().await = Some(unit);
  Ok(PipelineControl::Continue)
}

async fn fetch_cart_with_prices(ctx: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, PlaceOrderError> {
  let (user_id, slot) = {
    let data = ctx.read();
    (data.user_id, data.unit.clone())
  };
  let lines = {
    let mut guard = slot.lock().await;
    let unit = guard.as_mut().ok_or_else(|| unit_not_open(STEP_FETCH_CART))?;
    unit.fetch_cart_with_prices(user_id).await?
  };

  if lines.is_empty() {
    event!(Level::INFO, user_id, "Cart is empty, nothing to place.");
    return Err(PlaceOrderError::EmptyCart { user_id });
  }
  event!(Level::DEBUG, user_id, lines = lines.len(), "Cart fetched.");
  ctx.write().lines = lines;
  Ok(PipelineControl::Continue)
}

async fn partition_cart(ctx: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, PlaceOrderError> {
  let mut data = ctx.write();
  let groups = partition_by_restaurant(&data.lines, data.delivery_surcharge)?;
  event!(Level::DEBUG, groups = groups.len(), "Cart partitioned by restaurant.");
  data.groups = groups;
  Ok(PipelineControl::Continue)
}

async fn persist_orders(ctx: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, PlaceOrderError> {
  let (user_id, surcharge, groups, slot) = {
    let data = ctx.read();
    (data.user_id, data.delivery_surcharge, data.groups.clone(), data.unit.clone())
  };

  let mut placed = Vec::with_capacity(groups.len());
  {
    let mut guard = slot.lock().await;
    let unit = guard.as_mut().ok_or_else(|| unit_not_open(STEP_PERSIST))?;
    for group in &groups {
      let order_id = unit.create_order(user_id, &group.restaurant, group.total_amount).await?;
      for line in &group.lines {
        unit
          .create_order_line(order_id, line.item_id, line.quantity, line.price)
          .await?;
      }
      event!(
        Level::DEBUG,
        order_id,
        restaurant = %group.restaurant,
        subtotal = group.subtotal(surcharge),
        total_amount = group.total_amount,
        "Order staged."
      );
      placed.push(PlacedOrder {
        order_id,
        restaurant: group.restaurant.clone(),
        total_amount: group.total_amount,
        line_count: group.lines.len(),
      });
    }
  }

  ctx.write().placed = placed;
  Ok(PipelineControl::Continue)
}

async fn clear_cart(ctx: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, PlaceOrderError> {
  let (user_id, line_ids, slot) = {
    let data = ctx.read();
    let line_ids: Vec<_> = data.lines.iter().map(|line| line.cart_line_id).collect();
    (data.user_id, line_ids, data.unit.clone())
  };
  let mut guard = slot.lock().await;
  let unit = guard.as_mut().ok_or_else(|| unit_not_open(STEP_CLEAR_CART))?;
  unit.clear_cart(user_id, &line_ids).await?;
  Ok(PipelineControl::Continue)
}

async fn commit_unit_of_work(ctx: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, PlaceOrderError> {
  let slot = ctx.read().unit.clone();
  let unit = slot.lock().await.take().ok_or_else(|| unit_not_open(STEP_COMMIT))?;
  ctx.write().committing = true;
  unit.commit().await?;
  Ok(PipelineControl::Continue)
}

/// Places orders from users' carts.
pub struct OrderPlacement {
  source: Arc<dyn UnitOfWorkSource>,
  config: PlacementConfig,
  locks: UserLocks,
  pipeline: Arc<Pipeline<PlaceOrderCtxData, PlaceOrderError>>,
}

impl OrderPlacement {
  pub fn new(source: Arc<dyn UnitOfWorkSource>, config: PlacementConfig) -> Self {
    Self {
      source,
      config,
      locks: UserLocks::new(),
      pipeline: Arc::new(build_place_order_pipeline()),
    }
  }

  pub fn config(&self) -> &PlacementConfig {
    &self.config
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.pipeline.step_names()
  }

  /// Converts `user_id`'s cart into one `pending` order per restaurant.
  ///
  /// Returns the created orders in the order their restaurants first appear
  /// in the cart. On any error nothing is persisted and the cart is unchanged.
  #[instrument(name = "OrderPlacement::place_order", skip(self), err(Display))]
  pub async fn place_order(&self, user_id: UserId) -> Result<PlacementReceipt, PlaceOrderError> {
    let ctx = ContextData::new(PlaceOrderCtxData::new(
      user_id,
      self.config.delivery_surcharge,
      self.source.clone(),
    ));
    let slot = ctx.read().unit.clone();

    // The run future is dropped before any rollback below, releasing the
    // unit slot and the user lock it may hold.
    let outcome = {
      let mut run = std::pin::pin!(self.run_locked(user_id, ctx.clone()));
      match self.config.timeout {
        Some(limit) => match tokio::time::timeout(limit, run.as_mut()).await {
          Ok(outcome) => outcome,
          Err(_) => {
            let committing = ctx.read().committing;
            if committing {
              event!(Level::DEBUG, user_id, "Deadline passed during commit, awaiting its outcome.");
              run.await
            } else {
              event!(Level::WARN, user_id, timeout_ms = limit.as_millis() as u64, "Order placement timed out.");
              Err(PlaceOrderError::TimedOut)
            }
          }
        },
        None => run.await,
      }
    };

    match outcome {
      Ok(PipelineResult::Completed) => {
        let orders = std::mem::take(&mut ctx.write().placed);
        event!(Level::INFO, user_id, orders = orders.len(), "Orders placed.");
        Ok(PlacementReceipt { orders })
      }
      Ok(PipelineResult::Stopped) => {
        roll_back(&slot).await;
        Err(PlaceOrderError::Workflow(FlowError::Internal(
          "order placement pipeline stopped before commit".to_string(),
        )))
      }
      Err(e) => {
        roll_back(&slot).await;
        Err(e)
      }
    }
  }

  async fn run_locked(
    &self,
    user_id: UserId,
    ctx: ContextData<PlaceOrderCtxData>,
  ) -> Result<PipelineResult, PlaceOrderError> {
    let _user_lock = self.locks.acquire(user_id).await;
    self.pipeline.run(ctx).await
  }
}

async fn roll_back(slot: &UnitSlot) {
  let unit = slot.lock().await.take();
  if let Some(unit) = unit {
    if let Err(e) = unit.rollback().await {
      event!(Level::WARN, error = %e, "Rolling back the unit of work failed.");
    }
  }
}
