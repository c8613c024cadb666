//! Inbound message as handed over by the mail trigger.

use crate::util::collect_headers;
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::HashMap;
use tracing::warn;

/// Body chunks in arrival order.
pub type BodyStream = BoxStream<'static, std::io::Result<Bytes>>;

const CHUNK_SIZE: usize = 8 * 1024;

/// Header collection with case-insensitive lookup.
#[derive(Debug, Clone, Default)]
pub struct Headers(HashMap<String, String>);

impl Headers {
  pub fn get(&self, name: &str) -> Option<&str> {
    self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
  }

  pub fn insert(&mut self, name: &str, value: impl Into<String>) {
    self.0.insert(name.to_ascii_lowercase(), value.into());
  }
}

impl From<HashMap<String, String>> for Headers {
  fn from(map: HashMap<String, String>) -> Self {
    Self(
      map
        .into_iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v))
        .collect(),
    )
  }
}

pub struct RawMessage {
  pub from: String,
  pub to: Vec<String>,
  pub headers: Headers,
  /// The full message (header block included), streamed.
  pub body: BodyStream,
}

impl RawMessage {
  pub fn new(from: impl Into<String>, to: Vec<String>, headers: Headers, body: BodyStream) -> Self {
    Self {
      from: from.into(),
      to,
      headers,
      body,
    }
  }

  /// Build a message from a complete RFC 5322 payload, as received via SMTP DATA.
  pub fn from_data(from: impl Into<String>, to: Vec<String>, data: Vec<u8>) -> Self {
    let headers = match mailparse::parse_headers(&data) {
      Ok((parsed, _)) => Headers::from(collect_headers(&parsed)),
      Err(e) => {
        warn!("header parse error: {e}");
        Headers::default()
      }
    };
    let data = Bytes::from(data);
    let chunks: Vec<std::io::Result<Bytes>> = (0..data.len())
      .step_by(CHUNK_SIZE)
      .map(|start| Ok(data.slice(start..(start + CHUNK_SIZE).min(data.len()))))
      .collect();
    Self::new(from, to, headers, stream::iter(chunks).boxed())
  }
}

impl std::fmt::Debug for RawMessage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RawMessage")
      .field("from", &self.from)
      .field("to", &self.to)
      .field("headers", &self.headers)
      .finish_non_exhaustive()
  }
}
