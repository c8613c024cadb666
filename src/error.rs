//! Error taxonomy shared by the pipeline, store, notifier and HTTP layer.

use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("failed to read message body: {0}")]
    StreamRead(#[source] std::io::Error),
    #[error("failed to decode {part} part: {reason}")]
    Decode { part: &'static str, reason: String },
    #[error("store write failed: {0}")]
    StoreWrite(#[source] sqlx::Error),
    #[error("store read failed: {0}")]
    StoreRead(#[source] sqlx::Error),
    #[error("push endpoint responded {status}: {body}")]
    NotificationDelivery { status: u16, body: String },
    #[error("push request failed: {0}")]
    NotificationTransport(#[from] reqwest::Error),
    #[error("missing or invalid bearer token")]
    Unauthorized,
    #[error("record {key} is not valid JSON: {source}")]
    ListingDeserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot parse sender address: {0}")]
    InvalidSender(String),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
}

impl AppError {
    /// Only a broken body stream aborts processing of a message.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::StreamRead(_))
    }
}
