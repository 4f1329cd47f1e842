// core/src/pipeline/definition.rs

use crate::core::handler::Handler;
use crate::core::step::{SkipCondition, StepDef};
use crate::error::FlowError;
use std::collections::HashMap;

/// Step definition tuple accepted by [`Pipeline::new`]: `(name, optional, skip_if)`.
pub type StepEntry<'a, TData> = (&'a str, bool, Option<SkipCondition<TData>>);

/// An ordered list of named steps over a shared `ContextData<TData>`.
///
/// Each step has three handler phases (`before`, `on`, `after`), run in that
/// order. Handlers return `Result<PipelineControl, Err>`; engine failures are
/// turned into `Err` through its `From<FlowError>` bound.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) before: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) after: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new(step_defs: &[StepEntry<'_, TData>]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional, skip_if)| StepDef {
        name: (*name).to_string(),
        optional: *optional,
        skip_if: skip_if.clone(),
      })
      .collect();

    Self {
      steps,
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
    }
  }

  /// Step names in execution order.
  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  /// Panics on an unknown step name: registering a handler for a step that
  /// was never declared is a wiring bug, not a runtime condition.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!(
        "Pipeline setup error: {}",
        FlowError::StepNotFound {
          step_name: step_name.to_string()
        }
      );
    }
  }

  pub(crate) fn has_handlers(&self, step_name: &str) -> bool {
    [&self.before, &self.on, &self.after]
      .iter()
      .any(|phase| phase.get(step_name).is_some_and(|handlers| !handlers.is_empty()))
  }
}
