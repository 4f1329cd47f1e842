// server/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use dishpatch_server::config::{AppConfig, LogFormat};
use dishpatch_server::store::PgUnitOfWorkSource;
use dishpatch_server::{build_app_state, db, web};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(log_format: LogFormat) {
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_span_events(FmtSpan::CLOSE);

  match log_format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => cfg,
    Err(e) => {
      eprintln!("Failed to load application configuration: {}", e);
      std::process::exit(1);
    }
  };
  init_tracing(app_config.log_format);
  tracing::info!("Starting food-ordering server...");

  let db_pool = match db::connect(&app_config).await {
    Ok(pool) => {
      tracing::info!("Successfully connected to the database.");
      pool
    }
    Err(e) => {
      tracing::error!(error = %e, "Failed to connect to the database.");
      std::process::exit(1);
    }
  };

  if app_config.run_migrations {
    if let Err(e) = db::run_migrations(&db_pool).await {
      tracing::error!(error = %e, "Failed to apply migrations.");
      std::process::exit(1);
    }
  }

  if app_config.seed_db {
    match db::seed_demo_menu(&db_pool).await {
      Ok(inserted) => tracing::info!(inserted, "Demo menu seeding finished."),
      Err(e) => tracing::error!(error = %e, "Failed to seed database."),
    }
  }

  let server_address = app_config.bind_address();
  let placement_source = Arc::new(PgUnitOfWorkSource::new(db_pool.clone()));
  let app_state = build_app_state(db_pool, placement_source, app_config);
  tracing::info!(
    delivery_surcharge = app_state.config.delivery_surcharge,
    timeout_ms = ?app_state.config.place_order_timeout.map(|t| t.as_millis()),
    "Order placement configured."
  );

  tracing::info!("Attempting to bind server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
