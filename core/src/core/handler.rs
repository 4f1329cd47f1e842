// core/src/core/handler.rs

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

/// Boxed future produced by a step handler.
pub type HandlerFuture<Err> = Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>;

/// A type-erased async step handler.
///
/// It receives its own clone of the run's `ContextData<TData>` and resolves to
/// a [`PipelineControl`] or the pipeline's error type.
pub type Handler<TData, Err> = Box<dyn Fn(ContextData<TData>) -> HandlerFuture<Err> + Send + Sync>;
