// core/src/ordering/partition.rs

use crate::ordering::error::PlaceOrderError;
use crate::ordering::model::{PricedCartLine, RestaurantGroup};
use std::collections::HashMap;

/// Groups cart lines by restaurant and prices each group.
///
/// Restaurants are compared verbatim. Groups come out in the order their
/// restaurant first appears in `lines`, and lines keep their relative order
/// inside a group. Each total is Σ(price × quantity) + `delivery_surcharge`.
///
/// Every line is validated before anything is returned, so a bad line never
/// leaves a partial result behind.
pub fn partition_by_restaurant(
  lines: &[PricedCartLine],
  delivery_surcharge: i64,
) -> Result<Vec<RestaurantGroup>, PlaceOrderError> {
  let mut groups: Vec<RestaurantGroup> = Vec::new();
  let mut index_by_restaurant: HashMap<&str, usize> = HashMap::new();

  for line in lines {
    validate_line(line)?;
    let idx = *index_by_restaurant.entry(line.restaurant.as_str()).or_insert_with(|| {
      groups.push(RestaurantGroup {
        restaurant: line.restaurant.clone(),
        lines: Vec::new(),
        total_amount: 0,
      });
      groups.len() - 1
    });
    groups[idx].lines.push(line.clone());
  }

  for group in &mut groups {
    group.total_amount = group_total(group, delivery_surcharge)?;
  }
  Ok(groups)
}

fn validate_line(line: &PricedCartLine) -> Result<(), PlaceOrderError> {
  if line.quantity <= 0 {
    return Err(PlaceOrderError::InvalidCartLine {
      item_id: line.item_id,
      reason: format!("quantity must be positive, got {}", line.quantity),
    });
  }
  if line.price < 0 {
    return Err(PlaceOrderError::InvalidCartLine {
      item_id: line.item_id,
      reason: format!("price must not be negative, got {}", line.price),
    });
  }
  Ok(())
}

fn group_total(group: &RestaurantGroup, delivery_surcharge: i64) -> Result<i64, PlaceOrderError> {
  let overflow = || PlaceOrderError::AmountOverflow {
    restaurant: group.restaurant.clone(),
  };
  group
    .lines
    .iter()
    .try_fold(delivery_surcharge, |acc, line| {
      line.price.checked_mul(i64::from(line.quantity))?.checked_add(acc)
    })
    .ok_or_else(overflow)
}
