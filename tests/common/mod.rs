#![allow(dead_code)]

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tokio::{sync::Mutex, task::JoinHandle};
use verimail::{
    app::{AppState, Config},
    db, http,
    store::SqliteStore,
};

pub const API_KEY: &str = "test-secret";
pub const ORIGIN: &str = "https://dash.example.test";

pub async fn memory_store() -> SqliteStore {
    let db_url = db::ensure_sqlite_path("sqlite://:memory:");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await
        .expect("connect memory sqlite");
    db::run_migrations(&pool).await.expect("migrate");
    SqliteStore::new(pool)
}

pub fn test_config() -> Config {
    Config {
        api_key: Some(API_KEY.to_string()),
        allowed_origins: vec![ORIGIN.to_string()],
        ..Config::default()
    }
}

pub async fn start_api(store: SqliteStore, config: Config) -> (String, JoinHandle<()>) {
    let state = AppState {
        store,
        config: Arc::new(config),
    };
    let app: Router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), handle)
}

/// Stand-in push endpoint that records every payload and answers `status`.
#[derive(Clone)]
pub struct PushSink {
    pub received: Arc<Mutex<Vec<Value>>>,
    status: StatusCode,
}

impl PushSink {
    pub async fn payloads(&self) -> Vec<Value> {
        self.received.lock().await.clone()
    }
}

async fn accept_push(State(sink): State<PushSink>, Json(body): Json<Value>) -> (StatusCode, &'static str) {
    sink.received.lock().await.push(body);
    let text = if sink.status.is_success() { "ok" } else { "push rejected" };
    (sink.status, text)
}

pub async fn start_push_sink(status: StatusCode) -> (String, PushSink) {
    let sink = PushSink {
        received: Arc::new(Mutex::new(Vec::new())),
        status,
    };
    let app = Router::new()
        .route("/push", post(accept_push))
        .with_state(sink.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/push", addr), sink)
}
