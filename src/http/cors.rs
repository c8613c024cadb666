//! Cross-origin and security headers applied to every response.

use crate::app::{AppState, Config};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, HeaderValue, Method, StatusCode, header},
  middleware::Next,
  response::{IntoResponse, Response},
};

const STATIC_HEADERS: &[(&str, &str)] = &[
  ("access-control-allow-methods", "GET, OPTIONS"),
  (
    "access-control-allow-headers",
    "Content-Type, Authorization, X-Requested-With",
  ),
  ("access-control-max-age", "86400"),
  ("x-content-type-options", "nosniff"),
  ("x-frame-options", "DENY"),
  ("x-xss-protection", "1; mode=block"),
  (
    "strict-transport-security",
    "max-age=31536000; includeSubDomains",
  ),
  (
    "content-security-policy",
    "default-src 'none'; frame-ancestors 'none'",
  ),
  ("referrer-policy", "strict-origin-when-cross-origin"),
];

/// Headers for a request carrying `origin`. The allow-origin header is only
/// emitted for allow-listed origins.
pub fn cors_headers(origin: Option<&str>, config: &Config) -> HeaderMap {
  let mut headers = HeaderMap::new();
  if let Some(origin) = origin.filter(|o| config.origin_allowed(o)) {
    if let Ok(v) = HeaderValue::from_str(origin) {
      headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, v);
    }
  }
  headers.insert(header::VARY, HeaderValue::from_static("Origin"));
  for (name, value) in STATIC_HEADERS {
    headers.insert(*name, HeaderValue::from_static(*value));
  }
  headers
}

/// Answer preflights directly and decorate everything else.
pub async fn apply(State(state): State<AppState>, req: Request, next: Next) -> Response {
  let origin = req
    .headers()
    .get(header::ORIGIN)
    .and_then(|v| v.to_str().ok())
    .map(str::to_owned);
  let cors = cors_headers(origin.as_deref(), &state.config);

  if req.method() == Method::OPTIONS {
    return (StatusCode::NO_CONTENT, cors).into_response();
  }

  let mut res = next.run(req).await;
  res.headers_mut().extend(cors);
  res
}
