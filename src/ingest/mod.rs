//! Mail-to-verification pipeline: reassemble, split, extract, store, notify.

use crate::{
  app::Config,
  error::{AppError, AppResult},
  extract::extract,
  mime,
  models::verification::{extracted::Verification, record::VerificationRecord},
  notify::{MailSummary, Notifier, build_payload},
  store::{EphemeralStore, records::save_record},
  util::display_time,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

pub mod message;
pub mod reader;

pub use message::{BodyStream, Headers, RawMessage};
pub use reader::read_body;

const DEFAULT_SUBJECT: &str = "(no subject)";

/// What happened to one message.
#[derive(Debug)]
pub struct Outcome {
  pub verification: Option<Verification>,
  pub stored: bool,
  pub notified: bool,
}

/// Processes one message per call; holds no per-message state.
#[derive(Clone)]
pub struct Pipeline<S> {
  store: S,
  notifier: Notifier,
  config: Arc<Config>,
}

impl<S: EphemeralStore> Pipeline<S> {
  pub fn new(store: S, notifier: Notifier, config: Arc<Config>) -> Self {
    Self {
      store,
      notifier,
      config,
    }
  }

  /// Run the full pipeline for `msg`.
  ///
  /// Only a failure reading the body is returned as an error; store and push
  /// failures are logged and reflected in the [`Outcome`].
  pub async fn process(&self, msg: RawMessage) -> AppResult<Outcome> {
    let RawMessage {
      from,
      headers,
      body,
      ..
    } = msg;

    let raw = read_body(body).await?;
    let content = mime::split(&raw, headers.get("content-type").unwrap_or_default());
    let verification = extract(&content);

    let subject = headers.get("subject").unwrap_or(DEFAULT_SUBJECT);
    let received_time = display_time(headers.get("date"), &self.config.display_offset, Utc::now());

    match &verification {
      Some(v) => info!(kind = ?v.kind, %from, "verification found"),
      None => info!(%from, subject, "no verification content"),
    }

    let store_write = async {
      let Some(v) = verification.as_ref() else {
        return false;
      };
      match self.save(v, &from, &received_time).await {
        Ok(()) => true,
        Err(e) => {
          error!("store write failed for {from}: {e}");
          false
        }
      }
    };

    let payload = build_payload(
      &MailSummary {
        from: &from,
        subject,
        date: &received_time,
        content: content.preview(),
      },
      verification.as_ref(),
    );
    let push = async {
      if !self.notifier.is_enabled() {
        return false;
      }
      match self.notifier.send(&payload).await {
        Ok(()) => true,
        Err(e) => {
          warn!("notification failed: {e}");
          false
        }
      }
    };

    let (stored, notified) = tokio::join!(store_write, push);
    Ok(Outcome {
      verification,
      stored,
      notified,
    })
  }

  async fn save(&self, v: &Verification, from: &str, received_time: &str) -> AppResult<()> {
    let (sender_name, sender_email) = parse_sender(from)?;
    let record = VerificationRecord::new(v, sender_name, sender_email, received_time);
    save_record(&self.store, &record, self.config.record_ttl_secs).await
  }
}

/// Split a sender into (local part, address).
pub fn parse_sender(from: &str) -> AppResult<(String, String)> {
  let addrs = mailparse::addrparse(from).map_err(|e| AppError::InvalidSender(e.to_string()))?;
  let addr = addrs
    .extract_single_info()
    .map(|info| info.addr)
    .ok_or_else(|| AppError::InvalidSender(from.to_string()))?;
  let Some((local, domain)) = addr.split_once('@') else {
    return Err(AppError::InvalidSender(from.to_string()));
  };
  if local.trim().is_empty() || domain.trim().is_empty() {
    return Err(AppError::InvalidSender(from.to_string()));
  }
  Ok((local.trim().to_string(), addr.trim().to_string()))
}
