// server/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
  pub id: i64,
  pub username: String,
  pub email: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub role: String,
  pub created_at: DateTime<Utc>,
}

/// What login hands back to the client.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PublicUser {
  pub id: i64,
  pub username: String,
  pub email: String,
}

impl From<&User> for PublicUser {
  fn from(user: &User) -> Self {
    Self {
      id: user.id,
      username: user.username.clone(),
      email: user.email.clone(),
    }
  }
}
