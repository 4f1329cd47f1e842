// core/src/core/control.rs

//! Flow-control signals returned by step handlers, and the outcome of a run.

/// Returned by a handler to let the run proceed or halt it cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  /// Halt now. Remaining handlers of this step and all later steps are skipped.
  Stop,
}

/// How a run ended when no handler returned an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  Completed,
  Stopped,
}
