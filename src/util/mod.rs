//! Utility functions: tracing, header collection, time formatting.

use chrono::{DateTime, FixedOffset, Utc};
use mailparse::MailHeader;
use std::collections::HashMap;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize pretty CLI logging.
pub fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let _ = fmt()
    .with_env_filter(filter)
    .with_target(false)
    .pretty()
    .try_init();
}

/// Collect headers into a lowercase HashMap. Later duplicates are ignored.
pub fn collect_headers(headers: &[MailHeader<'_>]) -> HashMap<String, String> {
  let mut map = HashMap::new();
  for h in headers {
    map
      .entry(h.get_key().to_ascii_lowercase())
      .or_insert_with(|| h.get_value());
  }
  map
}

/// Render an RFC 2822 `Date` header in `offset`, or `now` when it is absent or garbage.
pub fn display_time(date_header: Option<&str>, offset: &FixedOffset, now: DateTime<Utc>) -> String {
  let when = date_header
    .and_then(|d| mailparse::dateparse(d).ok())
    .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
    .unwrap_or(now);
  when.with_timezone(offset).format("%Y/%-m/%-d %H:%M:%S").to_string()
}
