// server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use dishpatch::{FlowError, PlaceOrderError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Order Placement Error: {0}")]
  Ordering(#[from] PlaceOrderError),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),

  /// A pipeline returned `Stopped` where the request needed it to complete.
  #[error("Pipeline execution was halted by a handler.")]
  PipelineHaltedByHandler,
}

impl AppError {
  /// Message shown to the client. Persistence and internal failures stay
  /// generic; their detail only goes to the log.
  pub fn client_message(&self) -> String {
    match self {
      AppError::Validation(m) | AppError::Auth(m) | AppError::NotFound(m) | AppError::Conflict(m) => m.clone(),
      AppError::Ordering(e) if e.is_user_correctable() => e.to_string(),
      AppError::Ordering(PlaceOrderError::TimedOut) => "Order placement timed out, please try again.".to_string(),
      AppError::Ordering(_) => "Order could not be placed.".to_string(),
      AppError::Sqlx(_) => "Database operation failed.".to_string(),
      AppError::Config(_) => "Configuration issue.".to_string(),
      AppError::Workflow { .. } | AppError::Internal(_) => "An internal error occurred.".to_string(),
      AppError::PipelineHaltedByHandler => "Process halted as expected by business logic.".to_string(),
    }
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
      Err(err) => AppError::Internal(err.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) | AppError::PipelineHaltedByHandler => StatusCode::CONFLICT,
      AppError::Ordering(e) if e.is_user_correctable() => StatusCode::BAD_REQUEST,
      AppError::Ordering(PlaceOrderError::TimedOut) => StatusCode::SERVICE_UNAVAILABLE,
      AppError::Ordering(_)
      | AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, detail = ?self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Responding with error");
    }
    HttpResponse::build(status).json(json!({
      "success": false,
      "message": self.client_message(),
    }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
