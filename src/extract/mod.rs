//! Verification extraction over decoded message content.
//!
//! Codes are searched first, in the plain-text body only. Links are searched
//! only when no code was found, and only in the HTML body. The first hit
//! wins and at most one result is produced.

use crate::{mime::DecodedContent, models::verification::extracted::Verification};

pub mod code;
pub mod link;

/// Run both stages over `content`.
pub fn extract(content: &DecodedContent) -> Option<Verification> {
    if let Some(code) = code::extract_code(content.text()) {
        return Some(Verification::number(code));
    }
    link::extract_link(content.html()).map(Verification::link)
}
