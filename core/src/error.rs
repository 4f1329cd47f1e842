// core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Failures raised by the workflow engine itself, as opposed to errors a
/// step handler returns on its own behalf.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("No pipeline registered for context type {context_type}")]
  PipelineNotRegistered { context_type: String },

  #[error("Context type mismatch in '{step_name}' (expected {expected_type})")]
  TypeMismatch { step_name: String, expected_type: String },

  #[error("Error in step handler or external operation. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },

  #[error("Internal workflow error: {0}")]
  Internal(String),
}

impl From<AnyhowError> for FlowError {
  fn from(source: AnyhowError) -> Self {
    FlowError::HandlerError { source }
  }
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
