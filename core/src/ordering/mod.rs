// core/src/ordering/mod.rs

//! Order placement: cart → one order per restaurant, atomically.

pub mod error;
pub mod locks;
pub mod memory;
pub mod model;
pub mod partition;
pub mod placement;
pub mod store;

pub use error::PlaceOrderError;
pub use locks::{UserLockGuard, UserLocks};
pub use memory::{FailPoint, MemoryStore, StoredOrder, StoredOrderLine};
pub use model::{CartLineId, ItemId, OrderId, PlacedOrder, PlacementReceipt, PricedCartLine, RestaurantGroup, UserId};
pub use partition::partition_by_restaurant;
pub use placement::{OrderPlacement, PlaceOrderCtxData, PlacementConfig, DEFAULT_DELIVERY_SURCHARGE};
pub use store::{CartStore, OrderStore, StoreError, UnitOfWork, UnitOfWorkSource};
