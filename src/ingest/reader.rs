//! Reassembles a chunked body into text.

use super::message::BodyStream;
use crate::error::{AppError, AppResult};
use futures::StreamExt;
use tracing::debug;

/// Drain `body` into one buffer and decode it as UTF-8.
///
/// Invalid sequences are replaced with U+FFFD. A failing chunk aborts the read
/// and nothing read so far is returned. The stream is consumed and dropped on
/// every path.
pub async fn read_body(mut body: BodyStream) -> AppResult<String> {
  let mut buf: Vec<u8> = Vec::new();
  let mut chunks = 0usize;
  while let Some(chunk) = body.next().await {
    let chunk = chunk.map_err(AppError::StreamRead)?;
    buf.extend_from_slice(&chunk);
    chunks += 1;
  }
  debug!(chunks, bytes = buf.len(), "message body reassembled");
  Ok(String::from_utf8_lossy(&buf).into_owned())
}
