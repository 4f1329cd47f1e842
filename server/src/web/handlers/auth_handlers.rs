// server/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::pipelines::contexts::{LoginCtxData, RegisterCtxData};
use crate::state::AppState;
use dishpatch::{ContextData, PipelineResult};

#[derive(Deserialize, Debug)]
pub struct RegisterRequestPayload {
  pub username: String,
  pub email: String,
  pub password: String,
  pub confirm_password: String,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequestPayload {
  pub username: String,
  pub password: String,
}

#[instrument(
    name = "handler::register",
    skip(app_state, req_payload),
    fields(username = %req_payload.username)
)]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RegisterRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx_data = ContextData::new(RegisterCtxData {
    app_state: app_state.get_ref().clone(),
    username: payload.username,
    email: payload.email,
    password: payload.password,
    confirm_password: payload.confirm_password,
    created_user_id: None,
  });

  match app_state.workflows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let user_id = ctx_data.read().created_user_id.ok_or_else(|| {
        warn!("Register pipeline completed without a user id.");
        AppError::Internal("Registration completed without creating a user.".to_string())
      })?;
      info!(user_id, "Registration successful.");
      Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Registration successful.",
        "user_id": user_id,
      })))
    }
    PipelineResult::Stopped => Err(AppError::PipelineHaltedByHandler),
  }
}

#[instrument(
    name = "handler::login",
    skip(app_state, req_payload),
    fields(username = %req_payload.username)
)]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx_data = ContextData::new(LoginCtxData {
    app_state: app_state.get_ref().clone(),
    username: payload.username,
    password: payload.password,
    candidate_user: None,
    authenticated_user: None,
  });

  match app_state.workflows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let user = ctx_data
        .read()
        .authenticated_user
        .clone()
        .ok_or_else(|| AppError::Auth(crate::pipelines::login_pipeline::INVALID_CREDENTIALS.to_string()))?;
      Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Login successful.",
        "user": user,
      })))
    }
    PipelineResult::Stopped => {
      warn!("Login pipeline was stopped by a handler.");
      Err(AppError::PipelineHaltedByHandler)
    }
  }
}
