// core/src/pipeline/execution.rs

//! `Pipeline::run()`: walks the steps in order and drives their handlers.

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::core::handler::Handler;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use std::collections::HashMap;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Executes every step against `ctx_data`.
  ///
  /// Per step: evaluate `skip_if`, then run `before`, `on` and `after`
  /// handlers in registration order. The first handler error is returned as
  /// is; the first `PipelineControl::Stop` ends the run with
  /// `PipelineResult::Stopped`. A non-optional step with no handlers at all
  /// fails with `FlowError::HandlerMissing`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(
        Level::INFO,
        "pipeline_step",
        step_name,
        step_index = step_idx,
        optional = step_def.optional
      );

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(ctx_data.clone()) {
          event!(parent: &step_span, Level::INFO, "Step skipped by its skip condition.");
          continue;
        }
      }

      if !self.has_handlers(step_name) {
        if step_def.optional {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(parent: &step_span, Level::ERROR, "Non-optional step has no handlers.");
        return Err(Err::from(FlowError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      for (phase_name, phase) in [("before", &self.before), ("on", &self.on), ("after", &self.after)] {
        let control = run_phase(phase, step_name, phase_name, &ctx_data)
          .instrument(step_span.clone())
          .await?;
        if control == PipelineControl::Stop {
          event!(parent: &step_span, Level::INFO, phase = phase_name, "Pipeline stopped by a handler.");
          return Ok(PipelineResult::Stopped);
        }
      }
      event!(parent: &step_span, Level::DEBUG, "Step finished.");
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }
}

async fn run_phase<TData, Err>(
  handlers: &HashMap<String, Vec<Handler<TData, Err>>>,
  step_name: &str,
  phase_name: &'static str,
  ctx_data: &ContextData<TData>,
) -> Result<PipelineControl, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + Send + Sync + 'static,
{
  let Some(handlers) = handlers.get(step_name) else {
    return Ok(PipelineControl::Continue);
  };

  for (handler_idx, handler_fn) in handlers.iter().enumerate() {
    match handler_fn(ctx_data.clone()).await {
      Ok(PipelineControl::Continue) => {}
      Ok(PipelineControl::Stop) => return Ok(PipelineControl::Stop),
      Err(e) => {
        event!(Level::ERROR, phase = phase_name, handler_index = handler_idx, error = %e, "Step handler failed.");
        return Err(e);
      }
    }
  }
  Ok(PipelineControl::Continue)
}
