//! Stored verification record, also the `/codes` response item.

use super::extracted::{Verification, VerificationKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: VerificationKind,
    pub sender_name: String,
    pub sender_email: String,
    pub received_time: String,
    /// Store key without namespace; only set on records read back from the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl VerificationRecord {
    pub fn new(
        verification: &Verification,
        sender_name: impl Into<String>,
        sender_email: impl Into<String>,
        received_time: impl Into<String>,
    ) -> Self {
        Self {
            code: verification.value.clone(),
            kind: verification.kind,
            sender_name: sender_name.into(),
            sender_email: sender_email.into(),
            received_time: received_time.into(),
            key: None,
        }
    }
}
