// core/src/ordering/memory.rs

//! In-memory `UnitOfWorkSource`.
//!
//! Used by tests, benchmarks and local runs. A unit stages every write and
//! applies all of them under one lock on commit; rollback or drop discards
//! them. Failure injection and artificial latency make the atomicity and
//! timeout paths observable.

use crate::ordering::model::{CartLineId, ItemId, OrderId, PricedCartLine, UserId};
use crate::ordering::store::{CartStore, OrderStore, StoreError, UnitOfWork, UnitOfWorkSource};
use anyhow::anyhow;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{event, Level};

/// Where an injected failure fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
  FetchCart,
  /// The `nth` (1-based) `create_order` call of a unit fails.
  CreateOrder { nth: usize },
  CreateOrderLine,
  ClearCart,
  Commit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
  pub price: i64,
  pub restaurant: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOrder {
  pub id: OrderId,
  pub user_id: UserId,
  pub restaurant: String,
  pub total_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOrderLine {
  pub order_id: OrderId,
  pub item_id: ItemId,
  pub quantity: i32,
  pub price: i64,
}

#[derive(Debug, Clone, Copy)]
struct CartRow {
  id: CartLineId,
  item_id: ItemId,
  quantity: i32,
}

#[derive(Debug, Default)]
struct MemoryState {
  menu: HashMap<ItemId, MenuEntry>,
  /// Per user, in insertion order.
  carts: HashMap<UserId, Vec<CartRow>>,
  next_cart_line_id: CartLineId,
  orders: Vec<StoredOrder>,
  order_lines: Vec<StoredOrderLine>,
  fail_point: Option<FailPoint>,
  latency: Duration,
  commits: u64,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  state: Arc<Mutex<MemoryState>>,
  next_order_id: Arc<AtomicI64>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Every unit operation sleeps `latency` before touching state.
  pub fn with_latency(self, latency: Duration) -> Self {
    self.state.lock().latency = latency;
    self
  }

  pub fn add_menu_item(&self, item_id: ItemId, price: i64, restaurant: &str) {
    self.state.lock().menu.insert(
      item_id,
      MenuEntry {
        price,
        restaurant: restaurant.to_string(),
      },
    );
  }

  /// Changes the current price of a menu item; already placed lines keep theirs.
  pub fn set_price(&self, item_id: ItemId, price: i64) {
    if let Some(entry) = self.state.lock().menu.get_mut(&item_id) {
      entry.price = price;
    }
  }

  /// Adds `quantity` to the user's line for `item_id`, creating it if needed.
  pub fn add_to_cart(&self, user_id: UserId, item_id: ItemId, quantity: i32) {
    let mut state = self.state.lock();
    state.next_cart_line_id += 1;
    let id = state.next_cart_line_id;
    let cart = state.carts.entry(user_id).or_default();
    match cart.iter_mut().find(|row| row.item_id == item_id) {
      Some(row) => row.quantity += quantity,
      None => cart.push(CartRow { id, item_id, quantity }),
    }
  }

  pub fn fail_on(&self, point: FailPoint) {
    self.state.lock().fail_point = Some(point);
  }

  pub fn clear_failures(&self) {
    self.state.lock().fail_point = None;
  }

  pub fn cart(&self, user_id: UserId) -> Vec<(ItemId, i32)> {
    let state = self.state.lock();
    state
      .carts
      .get(&user_id)
      .map(|cart| cart.iter().map(|row| (row.item_id, row.quantity)).collect())
      .unwrap_or_default()
  }

  pub fn orders(&self) -> Vec<StoredOrder> {
    self.state.lock().orders.clone()
  }

  pub fn order_lines(&self, order_id: OrderId) -> Vec<StoredOrderLine> {
    let state = self.state.lock();
    state.order_lines.iter().filter(|l| l.order_id == order_id).cloned().collect()
  }

  /// Number of units committed so far.
  pub fn commits(&self) -> u64 {
    self.state.lock().commits
  }

  fn fail_point(&self) -> Option<FailPoint> {
    self.state.lock().fail_point
  }

  async fn delay(&self) {
    let latency = self.state.lock().latency;
    if !latency.is_zero() {
      tokio::time::sleep(latency).await;
    }
  }
}

fn injected(operation: &'static str) -> StoreError {
  event!(Level::DEBUG, operation, "Injected store failure.");
  StoreError::new(operation, anyhow!("injected failure"))
}

#[async_trait]
impl UnitOfWorkSource for MemoryStore {
  async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
    self.delay().await;
    Ok(Box::new(MemoryUnit {
      store: self.clone(),
      staged_orders: Vec::new(),
      staged_lines: Vec::new(),
      fetched: Vec::new(),
      cleared: Vec::new(),
      create_order_calls: 0,
    }))
  }
}

struct MemoryUnit {
  store: MemoryStore,
  staged_orders: Vec<StoredOrder>,
  staged_lines: Vec<StoredOrderLine>,
  /// Cart rows as this unit read them: (user, row id, quantity read).
  fetched: Vec<(UserId, CartLineId, i32)>,
  /// Rows this unit will consume on commit.
  cleared: Vec<(UserId, CartLineId)>,
  create_order_calls: usize,
}

#[async_trait]
impl CartStore for MemoryUnit {
  async fn fetch_cart_with_prices(&mut self, user_id: UserId) -> Result<Vec<PricedCartLine>, StoreError> {
    self.store.delay().await;
    if self.store.fail_point() == Some(FailPoint::FetchCart) {
      return Err(injected("fetch_cart_with_prices"));
    }

    let lines: Vec<PricedCartLine> = {
      let state = self.store.state.lock();
      state
        .carts
        .get(&user_id)
        .map(|cart| {
          cart
            .iter()
            .filter(|row| !self.cleared.contains(&(user_id, row.id)))
            .filter_map(|row| {
              state.menu.get(&row.item_id).map(|entry| PricedCartLine {
                cart_line_id: row.id,
                item_id: row.item_id,
                quantity: row.quantity,
                price: entry.price,
                restaurant: entry.restaurant.clone(),
              })
            })
            .collect()
        })
        .unwrap_or_default()
    };
    self
      .fetched
      .extend(lines.iter().map(|line| (user_id, line.cart_line_id, line.quantity)));
    Ok(lines)
  }

  async fn clear_cart(&mut self, user_id: UserId, line_ids: &[CartLineId]) -> Result<(), StoreError> {
    self.store.delay().await;
    if self.store.fail_point() == Some(FailPoint::ClearCart) {
      return Err(injected("clear_cart"));
    }
    self.cleared.extend(line_ids.iter().map(|id| (user_id, *id)));
    Ok(())
  }
}

#[async_trait]
impl OrderStore for MemoryUnit {
  async fn create_order(&mut self, user_id: UserId, restaurant: &str, total_amount: i64) -> Result<OrderId, StoreError> {
    self.store.delay().await;
    self.create_order_calls += 1;
    if self.store.fail_point() == Some(FailPoint::CreateOrder { nth: self.create_order_calls }) {
      return Err(injected("create_order"));
    }
    let id = self.store.next_order_id.fetch_add(1, Ordering::SeqCst) + 1;
    self.staged_orders.push(StoredOrder {
      id,
      user_id,
      restaurant: restaurant.to_string(),
      total_amount,
    });
    Ok(id)
  }

  async fn create_order_line(
    &mut self,
    order_id: OrderId,
    item_id: ItemId,
    quantity: i32,
    price: i64,
  ) -> Result<(), StoreError> {
    self.store.delay().await;
    if self.store.fail_point() == Some(FailPoint::CreateOrderLine) {
      return Err(injected("create_order_line"));
    }
    if !self.staged_orders.iter().any(|o| o.id == order_id) {
      return Err(StoreError::new(
        "create_order_line",
        anyhow!("order {order_id} does not exist in this unit"),
      ));
    }
    self.staged_lines.push(StoredOrderLine {
      order_id,
      item_id,
      quantity,
      price,
    });
    Ok(())
  }
}

#[async_trait]
impl UnitOfWork for MemoryUnit {
  async fn commit(self: Box<Self>) -> Result<(), StoreError> {
    self.store.delay().await;
    if self.store.fail_point() == Some(FailPoint::Commit) {
      return Err(injected("commit"));
    }
    let MemoryUnit {
      store,
      staged_orders,
      staged_lines,
      fetched,
      cleared,
      ..
    } = *self;

    let mut state = store.state.lock();
    state.orders.extend(staged_orders);
    state.order_lines.extend(staged_lines);
    // Only the quantity that was read is consumed; a concurrent add to the
    // same row stays in the cart.
    for (user_id, line_id) in cleared {
      let read_quantity = fetched
        .iter()
        .find(|(u, id, _)| *u == user_id && *id == line_id)
        .map(|(_, _, quantity)| *quantity);
      if let Some(cart) = state.carts.get_mut(&user_id) {
        if let Some(row) = cart.iter_mut().find(|row| row.id == line_id) {
          row.quantity -= read_quantity.unwrap_or(row.quantity);
        }
        cart.retain(|row| row.quantity > 0);
        if cart.is_empty() {
          state.carts.remove(&user_id);
        }
      }
    }
    state.commits += 1;
    Ok(())
  }

  async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
    event!(
      Level::DEBUG,
      staged_orders = self.staged_orders.len(),
      "Discarding staged writes."
    );
    Ok(())
  }
}
