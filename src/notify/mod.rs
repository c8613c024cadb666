//! Push notifications for processed mail.

use crate::{
  error::{AppError, AppResult},
  models::{
    push::push_payload::{PUSH_GROUP, PUSH_ICON, PUSH_LEVEL, PUSH_SOUND, PushPayload},
    verification::extracted::{Verification, VerificationKind},
  },
};
use reqwest::{Client, header};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Longest body excerpt carried in a notification, in characters.
pub const PREVIEW_CHARS: usize = 2000;

/// What the notification is about.
#[derive(Debug)]
pub struct MailSummary<'a> {
  pub from: &'a str,
  pub subject: &'a str,
  pub date: &'a str,
  pub content: &'a str,
}

/// Build the fixed-shape payload for one message.
pub fn build_payload(mail: &MailSummary<'_>, verification: Option<&Verification>) -> PushPayload {
  let title = match verification {
    Some(v) if v.kind == VerificationKind::Link => "📨 Verification link saved".to_string(),
    Some(v) => format!("📨 Verification code: {}", v.value),
    None => format!("📨 {}", mail.subject),
  };
  let body = match verification {
    Some(_) => format!("From: {}", mail.from),
    None => format!(
      "📨 {}\n📅 {}\n👤 {}\n\n{}",
      mail.subject,
      mail.date,
      mail.from,
      excerpt(mail.content, PREVIEW_CHARS)
    ),
  };
  let url = match verification {
    Some(v) if v.is_link() => v.value.clone(),
    _ => format!("mailto:{}", mail.from),
  };
  PushPayload {
    title,
    body,
    badge: 1,
    sound: PUSH_SOUND.to_string(),
    group: PUSH_GROUP.to_string(),
    icon: PUSH_ICON.to_string(),
    is_archive: 1,
    level: PUSH_LEVEL.to_string(),
    url,
  }
}

/// First `max` characters of `content`, marked with an ellipsis when cut.
fn excerpt(content: &str, max: usize) -> String {
  match content.char_indices().nth(max) {
    Some((cut, _)) => format!("{}…", &content[..cut]),
    None => content.to_string(),
  }
}

/// Sends payloads to the configured push endpoint.
#[derive(Clone)]
pub struct Notifier {
  client: Client,
  endpoint: Option<Url>,
}

impl Notifier {
  pub fn new(endpoint: Option<Url>, timeout: Duration) -> AppResult<Self> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, endpoint })
  }

  pub fn is_enabled(&self) -> bool {
    self.endpoint.is_some()
  }

  /// POST `payload`; any non-2xx answer is an error carrying the response body.
  /// Without an endpoint this is a no-op.
  pub async fn send(&self, payload: &PushPayload) -> AppResult<()> {
    let Some(endpoint) = self.endpoint.as_ref() else {
      debug!("push endpoint not configured; skipping notification");
      return Ok(());
    };
    let res = self
      .client
      .post(endpoint.clone())
      .header(header::ACCEPT, "application/json")
      .json(payload)
      .send()
      .await?;
    let status = res.status();
    if !status.is_success() {
      let body = res.text().await.unwrap_or_default();
      return Err(AppError::NotificationDelivery {
        status: status.as_u16(),
        body,
      });
    }
    debug!(status = status.as_u16(), "push delivered");
    Ok(())
  }
}
