// core/src/lib.rs

//! Dishpatch: order placement for a food-ordering backend, built on a small
//! async workflow engine.
//!
//! The engine runs named-step pipelines over a shared, lockable context:
//!  - `before` / `on` / `after` async handlers per step,
//!  - optional steps and skip conditions,
//!  - early `Stop`, first-error propagation,
//!  - a registry keyed by context type ([`Workflows`]).
//!
//! The [`ordering`] module uses it to implement order placement: a user's
//! cart is partitioned by restaurant, each group becomes one `pending` order
//! with price-snapshot lines plus a delivery surcharge, and the cart is
//! cleared, all inside one unit of work and serialized per user.

pub mod core;
pub mod error;
pub mod ordering;
pub mod pipeline;
pub mod registry;

pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::handler::Handler;
pub use crate::core::step::{SkipCondition, StepDef};
pub use crate::error::{FlowError, FlowResult};
pub use crate::pipeline::definition::Pipeline;
pub use crate::registry::Workflows;

pub use crate::ordering::{
  OrderPlacement, PlaceOrderError, PlacementConfig, PlacementReceipt, PricedCartLine, StoreError,
  UnitOfWork, UnitOfWorkSource,
};
