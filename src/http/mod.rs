//! HTTP router and handlers.

use crate::app::AppState;
use axum::{
    Router,
    http::header,
    middleware,
    response::IntoResponse,
    routing::get,
};

pub mod codes;
pub mod cors;

pub const LIVENESS: &str = "Email Worker is running";

/// Assemble the HTTP router. Unknown paths and methods answer the liveness text.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/codes", get(codes::list_codes).fallback(liveness))
        .fallback(liveness)
        .layer(middleware::from_fn_with_state(state.clone(), cors::apply))
        .with_state(state)
}

pub async fn liveness() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain;charset=UTF-8")], LIVENESS)
}
