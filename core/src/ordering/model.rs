// core/src/ordering/model.rs

pub type UserId = i64;
pub type ItemId = i64;
pub type OrderId = i64;
pub type CartLineId = i64;

/// One cart line joined with the menu item's current price and restaurant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCartLine {
  /// The cart row this line was read from; placement clears exactly these.
  pub cart_line_id: CartLineId,
  pub item_id: ItemId,
  pub quantity: i32,
  /// Unit price read at placement time; copied verbatim onto the order line.
  pub price: i64,
  pub restaurant: String,
}

/// Cart lines sharing one restaurant, with the order total they produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantGroup {
  pub restaurant: String,
  pub lines: Vec<PricedCartLine>,
  /// Σ(price × quantity) + delivery surcharge.
  pub total_amount: i64,
}

impl RestaurantGroup {
  pub fn subtotal(&self, delivery_surcharge: i64) -> i64 {
    self.total_amount - delivery_surcharge
  }
}

/// One order created by a placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
  pub order_id: OrderId,
  pub restaurant: String,
  pub total_amount: i64,
  pub line_count: usize,
}

/// Result of a successful placement, one entry per restaurant group in the
/// order the restaurants first appeared in the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementReceipt {
  pub orders: Vec<PlacedOrder>,
}

impl PlacementReceipt {
  pub fn order_ids(&self) -> Vec<OrderId> {
    self.orders.iter().map(|o| o.order_id).collect()
  }

  pub fn grand_total(&self) -> i64 {
    self.orders.iter().map(|o| o.total_amount).sum()
  }
}
