// server/src/pipelines/login_pipeline.rs

use crate::errors::AppError;
use crate::models::{PublicUser, User};
use crate::pipelines::contexts::LoginCtxData;
use crate::services::auth_service;
use dishpatch::{ContextData, Pipeline, PipelineControl, Workflows};
use tracing::{event, info, warn, Level};

/// The same message for an unknown user and a wrong password.
pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";

pub fn register_login_pipeline(workflows: &Workflows<AppError>) {
  let mut p = Pipeline::<LoginCtxData, AppError>::new(&[
    ("validate_login_input", false, None),
    ("fetch_user_by_username", false, None),
    ("verify_user_password", false, None),
  ]);

  p.on_root("validate_login_input", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      if guard.username.trim().is_empty() || guard.password.is_empty() {
        return Err(AppError::Validation("Username and password are required.".to_string()));
      }
      Ok(PipelineControl::Continue)
    })
  });

  p.on_root("fetch_user_by_username", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let (username, db_pool) = {
        let guard = ctx_data.read();
        (guard.username.trim().to_string(), guard.app_state.db_pool.clone())
      };

      event!(Level::DEBUG, %username, "Fetching user for login.");
      let user: Option<User> = sqlx::query_as(
        "SELECT id, username, email, password_hash, role, created_at FROM users WHERE username = $1",
      )
      .bind(&username)
      .fetch_optional(&db_pool)
      .await?;

      match user {
        Some(user) => {
          ctx_data.write().candidate_user = Some((PublicUser::from(&user), user.password_hash));
          Ok(PipelineControl::Continue)
        }
        None => {
          warn!(%username, "Login failed: unknown user.");
          Err(AppError::Auth(INVALID_CREDENTIALS.to_string()))
        }
      }
    })
  });

  p.on_root("verify_user_password", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let (candidate, password) = {
        let mut guard = ctx_data.write();
        (guard.candidate_user.take(), guard.password.clone())
      };
      let (user, password_hash) =
        candidate.ok_or_else(|| AppError::Internal("Login reached password check without a user.".to_string()))?;

      if !auth_service::verify_password(&password_hash, &password)? {
        warn!(user_id = user.id, "Login failed: wrong password.");
        return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
      }

      info!(user_id = user.id, "User logged in.");
      ctx_data.write().authenticated_user = Some(user);
      Ok(PipelineControl::Continue)
    })
  });

  workflows.register_pipeline(p);
}
