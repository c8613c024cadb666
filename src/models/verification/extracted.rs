//! Result of running the extractor over one message.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationKind {
    Number,
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub value: String,
    pub kind: VerificationKind,
}

impl Verification {
    pub fn number(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: VerificationKind::Number,
        }
    }

    pub fn link(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: VerificationKind::Link,
        }
    }

    pub fn is_link(&self) -> bool {
        self.kind == VerificationKind::Link
    }
}
