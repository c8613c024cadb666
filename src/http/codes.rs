//! `GET /codes`: live verification records for bearer-authenticated callers.

use crate::{
  app::{AppState, Config},
  error::AppError,
  store::{VERIFICATION_PREFIX, records::list_records},
};
use axum::{
  Json,
  extract::State,
  http::{HeaderMap, HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, error};

const CHALLENGE: &str = r#"Bearer realm="Access to codes""#;

/// Check `Authorization: Bearer <token>` against the configured key.
pub fn authorize(headers: &HeaderMap, config: &Config) -> Result<(), AppError> {
  let expected = config.api_key.as_deref().ok_or(AppError::Unauthorized)?;
  let token = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .and_then(|rest| rest.split(' ').next())
    .ok_or(AppError::Unauthorized)?;
  if constant_time_eq(token.as_bytes(), expected.as_bytes()) {
    Ok(())
  } else {
    Err(AppError::Unauthorized)
  }
}

/// Timing depends only on the lengths, never on where the inputs differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
  if a.len() != b.len() {
    return false;
  }
  a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

pub async fn list_codes(State(state): State<AppState>, headers: HeaderMap) -> Response {
  if let Err(e) = authorize(&headers, &state.config) {
    debug!("rejected /codes request: {e}");
    return unauthorized();
  }
  match list_records(&state.store, VERIFICATION_PREFIX).await {
    Ok(records) => Json(records).into_response(),
    Err(e) => {
      error!("list_codes error: {e}");
      (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
      )
        .into_response()
    }
  }
}

fn unauthorized() -> Response {
  let mut headers = HeaderMap::new();
  headers.insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE));
  (StatusCode::UNAUTHORIZED, headers, "Unauthorized").into_response()
}
