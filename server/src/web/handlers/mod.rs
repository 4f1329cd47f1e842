// server/src/web/handlers/mod.rs

pub mod auth_handlers;
pub mod cart_handlers;
pub mod menu_handlers;
pub mod order_handlers;
