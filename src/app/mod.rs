//! Application setup and runtime.

use crate::{db, http, ingest::Pipeline, notify::Notifier, smtp, store::SqliteStore};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tracing::{error, info};

mod config;

pub use config::{Config, parse_origins};

/// Shared state for the query API.
#[derive(Clone)]
pub struct AppState {
  pub store: SqliteStore,
  pub config: Arc<Config>,
}

/// Start the HTTP API, the SMTP trigger and the expiry sweeper.
pub async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
  crate::util::init_tracing();

  let config = Arc::new(Config::from_env()?);
  if config.api_key.is_none() {
    info!("VERIMAIL_API_KEY not set; /codes will reject every request");
  }

  let db_url = db::ensure_sqlite_path(&config.database_url);
  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(&db_url)
    .await?;
  db::run_migrations(&pool).await?;

  let store = SqliteStore::new(pool);
  store.spawn_sweeper(config.sweep_interval);

  let notifier = Notifier::new(config.push_url.clone(), config.push_timeout)?;
  let pipeline = Pipeline::new(store.clone(), notifier, config.clone());

  let state = AppState {
    store,
    config: config.clone(),
  };
  let app = http::build_router(state);

  info!("query API:     http://{}/codes", config.http_addr);
  info!("smtp trigger:  {}", config.smtp_addr);

  let smtp_listener = tokio::net::TcpListener::bind(config.smtp_addr).await?;
  tokio::spawn(async move {
    if let Err(e) = smtp::serve(smtp_listener, pipeline).await {
      error!("smtp listener error: {e}");
    }
  });

  let listener = tokio::net::TcpListener::bind(config.http_addr).await?;
  axum::serve(listener, app).await?;
  Ok(())
}
