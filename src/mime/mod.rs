//! Boundary-based multipart splitting and transfer decoding.
//!
//! Segments are classified by substring. When several segments claim the
//! same class, the last one in document order is kept.

use crate::error::AppError;
use base64::{
    Engine,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// Accepts padded and unpadded input.
const FORGIVING_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

static BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)boundary=(?:"([^"]+)"|([^;\s]+))"#).expect("valid boundary regex")
});

static BASE64_PAYLOAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Content-Transfer-Encoding:[ \t]*base64[\s\S]*?\r?\n\r?\n([\s\S]+?)[\r\n]*$")
        .expect("valid base64 payload regex")
});

static QP_PAYLOAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)Content-Transfer-Encoding:[ \t]*quoted-printable[\s\S]*?\r?\n\r?\n([\s\S]+?)[\r\n]*$",
    )
    .expect("valid quoted-printable payload regex")
});

static ANY_ENCODING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Content-Transfer-Encoding:").expect("valid encoding regex"));

static IDENTITY_ENCODING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Content-Transfer-Encoding:[ \t]*(?:7bit|8bit|binary)")
        .expect("valid identity encoding regex")
});

static HEADER_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\r?\n\r?\n([\s\S]+?)[\r\n]*$").expect("valid header end regex")
});

/// Body content after splitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedContent {
    /// No boundary was declared; the raw text, untouched.
    Single(String),
    Multipart { text: String, html: String },
}

impl DecodedContent {
    /// Text used for code search.
    pub fn text(&self) -> &str {
        match self {
            DecodedContent::Single(raw) => raw,
            DecodedContent::Multipart { text, .. } => text,
        }
    }

    /// HTML used for link search. Empty for single-part messages.
    pub fn html(&self) -> &str {
        match self {
            DecodedContent::Single(_) => "",
            DecodedContent::Multipart { html, .. } => html,
        }
    }

    /// Preferred human-readable body: text, falling back to HTML.
    pub fn preview(&self) -> &str {
        let text = self.text();
        if text.is_empty() { self.html() } else { text }
    }
}

/// Extract the `boundary` parameter from a `Content-Type` value.
pub fn boundary(content_type: &str) -> Option<&str> {
    let caps = BOUNDARY.captures(content_type)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// Split `raw` according to the boundary declared in `content_type`.
pub fn split(raw: &str, content_type: &str) -> DecodedContent {
    let Some(boundary) = boundary(content_type) else {
        return DecodedContent::Single(raw.to_string());
    };

    let delimiter = format!("--{boundary}");
    let mut text = String::new();
    let mut html = String::new();

    for segment in raw.split(&delimiter).filter(|s| !s.trim().is_empty()) {
        if segment.contains("text/plain") {
            match decode_segment(segment) {
                Ok(Some(decoded)) => text = decoded,
                Ok(None) => {}
                Err(reason) => {
                    let err = AppError::Decode { part: "text", reason };
                    warn!("{err}");
                    text.clear();
                }
            }
        }
        if segment.contains("text/html") {
            match decode_segment(segment) {
                Ok(Some(decoded)) => html = decoded,
                Ok(None) => {}
                Err(reason) => {
                    let err = AppError::Decode { part: "html", reason };
                    warn!("{err}");
                    html.clear();
                }
            }
        }
    }

    DecodedContent::Multipart { text, html }
}

/// Decode one segment's payload according to its transfer encoding.
///
/// `Ok(None)` means the segment carries no payload at all.
fn decode_segment(segment: &str) -> Result<Option<String>, String> {
    if let Some(caps) = BASE64_PAYLOAD.captures(segment) {
        let payload: String = caps[1].chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = FORGIVING_B64
            .decode(payload.as_bytes())
            .map_err(|e| e.to_string())?;
        return Ok(Some(String::from_utf8_lossy(&bytes).into_owned()));
    }
    if let Some(caps) = QP_PAYLOAD.captures(segment) {
        let bytes = quoted_printable::decode(caps[1].trim(), quoted_printable::ParseMode::Robust)
            .map_err(|e| e.to_string())?;
        return Ok(Some(String::from_utf8_lossy(&bytes).into_owned()));
    }
    if ANY_ENCODING.is_match(segment) && !IDENTITY_ENCODING.is_match(segment) {
        return Err("unsupported transfer encoding".to_string());
    }
    Ok(HEADER_END
        .captures(segment)
        .map(|caps| caps[1].to_string()))
}
