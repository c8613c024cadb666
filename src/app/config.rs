//! Runtime configuration, read once from the environment.

use crate::error::{AppError, AppResult};
use chrono::{FixedOffset, Offset, Utc};
use std::{env, net::SocketAddr, time::Duration};
use url::Url;

/// Everything the components need at construction time.
#[derive(Debug, Clone)]
pub struct Config {
  pub http_addr: SocketAddr,
  pub smtp_addr: SocketAddr,
  pub database_url: String,
  /// Bearer token for `GET /codes`. `None` locks the endpoint.
  pub api_key: Option<String>,
  pub allowed_origins: Vec<String>,
  pub push_url: Option<Url>,
  pub push_timeout: Duration,
  pub record_ttl_secs: u64,
  /// Offset used to render `received_time` on records.
  pub display_offset: FixedOffset,
  pub sweep_interval: Duration,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      http_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
      smtp_addr: SocketAddr::from(([127, 0, 0, 1], 2525)),
      database_url: "sqlite://verimail.db".to_string(),
      api_key: None,
      allowed_origins: vec!["http://localhost:3000".to_string()],
      push_url: None,
      push_timeout: Duration::from_secs(10),
      record_ttl_secs: 3600,
      display_offset: FixedOffset::east_opt(8 * 3600).unwrap_or(Utc.fix()),
      sweep_interval: Duration::from_secs(60),
    }
  }
}

impl Config {
  /// Overlay `VERIMAIL_*` variables on the defaults.
  pub fn from_env() -> AppResult<Self> {
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Overlay values produced by `lookup` on the defaults. Blank values are unset.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
    let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let mut cfg = Self::default();

    if let Some(v) = var("VERIMAIL_ADDR") {
      cfg.http_addr = parse_addr("VERIMAIL_ADDR", &v)?;
    }
    if let Some(v) = var("VERIMAIL_SMTP_ADDR") {
      cfg.smtp_addr = parse_addr("VERIMAIL_SMTP_ADDR", &v)?;
    }
    if let Some(v) = var("VERIMAIL_DATABASE") {
      cfg.database_url = v;
    }
    cfg.api_key = var("VERIMAIL_API_KEY");
    if let Some(v) = var("VERIMAIL_ALLOWED_ORIGINS") {
      cfg.allowed_origins = parse_origins(&v);
    }
    if let Some(v) = var("VERIMAIL_PUSH_URL") {
      let url = Url::parse(&v)
        .map_err(|e| AppError::Config(format!("VERIMAIL_PUSH_URL: {e}")))?;
      cfg.push_url = Some(url);
    }
    if let Some(v) = var("VERIMAIL_PUSH_TIMEOUT_SECS") {
      cfg.push_timeout = Duration::from_secs(parse_nonzero("VERIMAIL_PUSH_TIMEOUT_SECS", &v)?);
    }
    if let Some(v) = var("VERIMAIL_RECORD_TTL_SECS") {
      cfg.record_ttl_secs = parse_u64("VERIMAIL_RECORD_TTL_SECS", &v)?;
    }
    if let Some(v) = var("VERIMAIL_DISPLAY_OFFSET") {
      cfg.display_offset = v
        .parse()
        .map_err(|e| AppError::Config(format!("VERIMAIL_DISPLAY_OFFSET: {e}")))?;
    }
    if let Some(v) = var("VERIMAIL_SWEEP_INTERVAL_SECS") {
      cfg.sweep_interval = Duration::from_secs(parse_nonzero("VERIMAIL_SWEEP_INTERVAL_SECS", &v)?);
    }
    Ok(cfg)
  }

  pub fn origin_allowed(&self, origin: &str) -> bool {
    self.allowed_origins.iter().any(|o| o == origin)
  }
}

fn parse_addr(name: &str, raw: &str) -> AppResult<SocketAddr> {
  raw
    .trim()
    .parse()
    .map_err(|e| AppError::Config(format!("{name}: {e}")))
}

fn parse_u64(name: &str, raw: &str) -> AppResult<u64> {
  raw
    .trim()
    .parse()
    .map_err(|e| AppError::Config(format!("{name}: {e}")))
}

/// A zero interval cannot drive a timer.
fn parse_nonzero(name: &str, raw: &str) -> AppResult<u64> {
  match parse_u64(name, raw)? {
    0 => Err(AppError::Config(format!("{name}: must be greater than zero"))),
    n => Ok(n),
  }
}

/// Comma-separated list; blanks dropped.
pub fn parse_origins(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(|s| s.trim().trim_end_matches('/').to_string())
    .filter(|s| !s.is_empty())
    .collect()
}
