// core/src/registry.rs

//! `Workflows<E>`: pipelines registered by context type and run on demand.
//!
//! An application registers each `Pipeline<TData, HandlerErr>` once at start-up
//! and later runs whichever pipeline matches the `ContextData<TData>` it holds.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineResult;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, instrument, Level};

#[async_trait]
trait ErasedRunner<AppErr>: Send + Sync
where
  AppErr: std::error::Error + Send + Sync + 'static,
{
  /// `ctx_obj` must hold the `ContextData<TData>` this runner was registered for.
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, AppErr>;
}

struct Registered<TData, HandlerErr>
where
  TData: 'static + Send + Sync,
  HandlerErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pipeline: Arc<Pipeline<TData, HandlerErr>>,
}

#[async_trait]
impl<TData, HandlerErr, AppErr> ErasedRunner<AppErr> for Registered<TData, HandlerErr>
where
  TData: 'static + Send + Sync,
  HandlerErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
  AppErr: std::error::Error + From<HandlerErr> + From<FlowError> + Send + Sync + 'static,
{
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, AppErr> {
    let ctx_data = match ctx_obj.downcast::<ContextData<TData>>() {
      Ok(boxed) => *boxed,
      Err(_) => {
        let expected_type = std::any::type_name::<ContextData<TData>>().to_string();
        event!(Level::ERROR, %expected_type, "Context object type mismatch.");
        return Err(AppErr::from(FlowError::TypeMismatch {
          step_name: "registry_dispatch".to_string(),
          expected_type,
        }));
      }
    };
    self.pipeline.run(ctx_data).await.map_err(AppErr::from)
  }
}

/// Registry of pipelines keyed by their context data type.
///
/// `AppErr` is what [`Workflows::run`] returns; every registered pipeline's
/// handler error must convert into it.
pub struct Workflows<AppErr = FlowError>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pipelines: RwLock<HashMap<TypeId, Arc<dyn ErasedRunner<AppErr>>>>,
  _app_err: PhantomData<AppErr>,
}

impl<AppErr> Default for Workflows<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<AppErr> Workflows<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      pipelines: RwLock::new(HashMap::new()),
      _app_err: PhantomData,
    }
  }

  /// Registers `pipeline` for contexts of type `TData`, replacing any
  /// pipeline previously registered for that type.
  pub fn register_pipeline<TData, HandlerErr>(&self, pipeline: Pipeline<TData, HandlerErr>)
  where
    TData: 'static + Send + Sync,
    HandlerErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
    AppErr: From<HandlerErr>,
  {
    event!(
      Level::DEBUG,
      context_type = %std::any::type_name::<TData>(),
      steps = ?pipeline.step_names(),
      "Registering pipeline."
    );
    let runner: Arc<dyn ErasedRunner<AppErr>> = Arc::new(Registered {
      pipeline: Arc::new(pipeline),
    });
    self.pipelines.write().insert(TypeId::of::<TData>(), runner);
  }

  pub fn is_registered<TData: 'static + Send + Sync>(&self) -> bool {
    self.pipelines.read().contains_key(&TypeId::of::<TData>())
  }

  /// Runs the pipeline registered for `TData` against `ctx_data`.
  #[instrument(
    name = "Workflows::run",
    skip_all,
    fields(context_type = %std::any::type_name::<TData>())
  )]
  pub async fn run<TData>(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, AppErr>
  where
    TData: 'static + Send + Sync,
  {
    let runner = self
      .pipelines
      .read()
      .get(&TypeId::of::<TData>())
      .cloned()
      .ok_or_else(|| {
        let context_type = std::any::type_name::<TData>().to_string();
        event!(Level::ERROR, %context_type, "No pipeline registered.");
        AppErr::from(FlowError::PipelineNotRegistered { context_type })
      })?;

    runner.run_erased(Box::new(ctx_data)).await
  }
}
