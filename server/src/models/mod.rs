// server/src/models/mod.rs

//! Rows of the relational store.

pub mod cart_item;
pub mod menu_item;
pub mod order;
pub mod order_item;
pub mod user;

pub use cart_item::{CartItem, CartItemView};
pub use menu_item::{MenuItem, NewMenuItem};
pub use order::{Order, OrderStatus, RestaurantOrder};
pub use order_item::OrderItem;
pub use user::{PublicUser, User};
