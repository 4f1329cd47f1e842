// server/src/pipelines/register_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::RegisterCtxData;
use crate::services::auth_service;
use dishpatch::{ContextData, Pipeline, PipelineControl, Workflows};
use tracing::{event, info, warn, Level};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Shape check only: one `@` with text on both sides and a
/// dot in the domain.
pub fn looks_like_email(email: &str) -> bool {
  match email.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty() && !domain.contains('@') && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    }
    None => false,
  }
}

pub fn register_user_registration_pipeline(workflows: &Workflows<AppError>) {
  let mut p = Pipeline::<RegisterCtxData, AppError>::new(&[
    ("validate_registration_input", false, None),
    ("check_existing_user", false, None),
    ("create_user", false, None),
  ]);

  p.on_root("validate_registration_input", |ctx_data: ContextData<RegisterCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();

      if guard.password != guard.confirm_password {
        warn!("Registration rejected: password confirmation mismatch.");
        return Err(AppError::Validation("Password confirmation does not match.".to_string()));
      }
      if guard.username.trim().is_empty() {
        return Err(AppError::Validation("Username is required.".to_string()));
      }
      if !looks_like_email(guard.email.trim()) {
        return Err(AppError::Validation("A valid email is required.".to_string()));
      }
      if guard.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
          "Password must be at least {} characters long.",
          MIN_PASSWORD_LEN
        )));
      }
      Ok(PipelineControl::Continue)
    })
  });

  p.on_root("check_existing_user", |ctx_data: ContextData<RegisterCtxData>| {
    Box::pin(async move {
      let (username, email, db_pool) = {
        let guard = ctx_data.read();
        (
          guard.username.trim().to_string(),
          guard.email.trim().to_string(),
          guard.app_state.db_pool.clone(),
        )
      };

      let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)")
        .bind(&username)
        .bind(&email)
        .fetch_one(&db_pool)
        .await?;

      if taken {
        warn!(%username, "Registration rejected: username or email already in use.");
        return Err(AppError::Conflict("Username or email is already registered.".to_string()));
      }
      Ok(PipelineControl::Continue)
    })
  });

  p.on_root("create_user", |ctx_data: ContextData<RegisterCtxData>| {
    Box::pin(async move {
      let (username, email, password, db_pool) = {
        let guard = ctx_data.read();
        (
          guard.username.trim().to_string(),
          guard.email.trim().to_string(),
          guard.password.clone(),
          guard.app_state.db_pool.clone(),
        )
      };

      let password_hash = auth_service::hash_password(&password)?;

      let inserted = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (username, email, password_hash, role) VALUES ($1, $2, $3, 'user') RETURNING id",
      )
      .bind(&username)
      .bind(&email)
      .bind(password_hash)
      .fetch_one(&db_pool)
      .await;

      match inserted {
        Ok(user_id) => {
          ctx_data.write().created_user_id = Some(user_id);
          info!(user_id, %username, "User registered.");
          Ok(PipelineControl::Continue)
        }
        // Lost a race against a concurrent registration with the same name.
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
          Err(AppError::Conflict("Username or email is already registered.".to_string()))
        }
        Err(e) => {
          event!(Level::ERROR, error = %e, "Database error while creating user.");
          Err(AppError::Sqlx(e))
        }
      }
    })
  });

  workflows.register_pipeline(p);
}
