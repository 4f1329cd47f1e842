// server/src/config.rs

use crate::errors::{AppError, Result};
use dishpatch::ordering::{PlacementConfig, DEFAULT_DELIVERY_SURCHARGE};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
  #[default]
  Pretty,
  Json,
}

impl FromStr for LogFormat {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pretty" | "" => Ok(LogFormat::Pretty),
      "json" => Ok(LogFormat::Json),
      other => Err(AppError::Config(format!("Invalid LOG_FORMAT '{}': expected 'pretty' or 'json'", other))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub db_max_connections: u32,

  /// Flat fee added to every restaurant order.
  pub delivery_surcharge: i64,
  pub place_order_timeout: Option<Duration>,

  pub run_migrations: bool,
  pub seed_db: bool,
  pub log_format: LogFormat,
}

impl AppConfig {
  /// Loads `.env` if present, then reads the process environment.
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|var_name| env::var(var_name).ok())
  }

  /// Builds the config from any variable source; unset variables fall back
  /// to their defaults, `DATABASE_URL` excepted.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_or("SERVER_PORT", &lookup, 8080_u16)?;
    let database_url = lookup("DATABASE_URL")
      .filter(|url| !url.trim().is_empty())
      .ok_or_else(|| AppError::Config("Missing environment variable 'DATABASE_URL'".to_string()))?;
    let db_max_connections = parse_or("DB_MAX_CONNECTIONS", &lookup, 10_u32)?;
    if db_max_connections == 0 {
      return Err(AppError::Config("DB_MAX_CONNECTIONS must be at least 1".to_string()));
    }

    let delivery_surcharge = parse_or("DELIVERY_SURCHARGE", &lookup, DEFAULT_DELIVERY_SURCHARGE)?;
    if delivery_surcharge < 0 {
      return Err(AppError::Config("DELIVERY_SURCHARGE must not be negative".to_string()));
    }
    let place_order_timeout = match lookup("PLACE_ORDER_TIMEOUT_MS") {
      Some(raw) => Some(Duration::from_millis(parse_value("PLACE_ORDER_TIMEOUT_MS", &raw)?)),
      None => None,
    };

    let run_migrations = parse_or("RUN_MIGRATIONS", &lookup, false)?;
    let seed_db = parse_or("SEED_DB", &lookup, false)?;
    let log_format = lookup("LOG_FORMAT").map(|raw| raw.parse::<LogFormat>()).transpose()?.unwrap_or_default();

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      db_max_connections,
      delivery_surcharge,
      place_order_timeout,
      run_migrations,
      seed_db,
      log_format,
    })
  }

  pub fn placement_config(&self) -> PlacementConfig {
    PlacementConfig {
      delivery_surcharge: self.delivery_surcharge,
      timeout: self.place_order_timeout,
    }
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_value<T>(var_name: &str, raw: &str) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  raw
    .trim()
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, raw, e)))
}

fn parse_or<T>(var_name: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match lookup(var_name) {
    Some(raw) => parse_value(var_name, &raw),
    None => Ok(default),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|name| vars.get(name).cloned())
  }

  #[test]
  fn defaults_apply_when_only_database_url_is_set() {
    let cfg = config_from(&[("DATABASE_URL", "postgres://localhost/dishpatch")]).unwrap();
    assert_eq!(cfg.bind_address(), "127.0.0.1:8080");
    assert_eq!(cfg.db_max_connections, 10);
    assert_eq!(cfg.delivery_surcharge, 30_000);
    assert_eq!(cfg.place_order_timeout, None);
    assert!(!cfg.run_migrations);
    assert!(!cfg.seed_db);
    assert_eq!(cfg.log_format, LogFormat::Pretty);
    assert_eq!(cfg.placement_config(), PlacementConfig::default());
  }

  #[test]
  fn reads_every_variable() {
    let cfg = config_from(&[
      ("DATABASE_URL", "postgres://db/app"),
      ("SERVER_HOST", "0.0.0.0"),
      ("SERVER_PORT", "9000"),
      ("DB_MAX_CONNECTIONS", "4"),
      ("DELIVERY_SURCHARGE", "15000"),
      ("PLACE_ORDER_TIMEOUT_MS", "2500"),
      ("RUN_MIGRATIONS", "true"),
      ("SEED_DB", "true"),
      ("LOG_FORMAT", "JSON"),
    ])
    .unwrap();
    assert_eq!(cfg.bind_address(), "0.0.0.0:9000");
    assert_eq!(cfg.db_max_connections, 4);
    assert_eq!(cfg.placement_config().delivery_surcharge, 15_000);
    assert_eq!(cfg.placement_config().timeout, Some(Duration::from_millis(2500)));
    assert!(cfg.run_migrations && cfg.seed_db);
    assert_eq!(cfg.log_format, LogFormat::Json);
  }

  #[test]
  fn missing_database_url_is_a_config_error() {
    let err = config_from(&[]).unwrap_err();
    assert!(matches!(err, AppError::Config(ref m) if m.contains("DATABASE_URL")));
  }

  #[test]
  fn malformed_values_are_rejected() {
    for (name, value) in [
      ("SERVER_PORT", "eighty"),
      ("DB_MAX_CONNECTIONS", "0"),
      ("DELIVERY_SURCHARGE", "-1"),
      ("PLACE_ORDER_TIMEOUT_MS", "soon"),
      ("SEED_DB", "yes"),
      ("LOG_FORMAT", "xml"),
    ] {
      let err = config_from(&[("DATABASE_URL", "postgres://db/app"), (name, value)]).unwrap_err();
      assert!(matches!(err, AppError::Config(_)), "{name}={value} was accepted");
    }
  }
}
