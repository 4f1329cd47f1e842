// server/src/db.rs

//! Pool set-up, migrations and demo data.

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, instrument};

pub async fn connect(config: &AppConfig) -> Result<PgPool> {
  PgPoolOptions::new()
    .max_connections(config.db_max_connections)
    .connect(&config.database_url)
    .await
    .map_err(AppError::Sqlx)
}

#[instrument(name = "db::run_migrations", skip(pool), err(Display))]
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
  sqlx::migrate!("./migrations")
    .run(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;
  info!("Database migrations applied.");
  Ok(())
}

/// (name, price, restaurant, category, description)
const DEMO_MENU: &[(&str, i64, &str, &str, &str)] = &[
  ("Margherita Pizza", 150_000, "Pizza House", "pizza", "Tomato, mozzarella, basil"),
  ("Pepperoni Pizza", 170_000, "Pizza House", "pizza", "Spicy pepperoni and cheese"),
  ("Garlic Bread", 45_000, "Pizza House", "sides", "Toasted with garlic butter"),
  ("Beef Pho", 90_000, "Pho 24", "noodles", "Rice noodles in beef broth"),
  ("Spring Rolls", 40_000, "Pho 24", "sides", "Fresh rolls with shrimp"),
  ("Classic Burger", 120_000, "Burger Lab", "burgers", "Beef patty, cheddar, pickles"),
  ("Fries", 35_000, "Burger Lab", "sides", "Crispy potato fries"),
];

/// Inserts the demo menu when `menu_items` is empty. Returns the number of
/// rows inserted.
#[instrument(name = "db::seed_demo_menu", skip(pool), err(Display))]
pub async fn seed_demo_menu(pool: &PgPool) -> Result<usize> {
  let mut tx = pool.begin().await?;
  let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_items")
    .fetch_one(&mut *tx)
    .await?;
  if existing > 0 {
    info!(existing, "Menu already populated, skipping seed.");
    return Ok(0);
  }

  for (name, price, restaurant, category, description) in DEMO_MENU {
    sqlx::query(
      "INSERT INTO menu_items (name, price, restaurant, category, description, delivery_time, distance) \
       VALUES ($1, $2, $3, $4, $5, 30, 2.5)",
    )
    .bind(*name)
    .bind(*price)
    .bind(*restaurant)
    .bind(*category)
    .bind(*description)
    .execute(&mut *tx)
    .await?;
  }
  tx.commit().await?;
  info!(items = DEMO_MENU.len(), "Demo menu seeded.");
  Ok(DEMO_MENU.len())
}
