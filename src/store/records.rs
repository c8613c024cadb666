//! Verification records on top of the raw key-value store.

use super::{EphemeralStore, VERIFICATION_PREFIX};
use crate::{
    error::{AppError, AppResult},
    models::verification::record::VerificationRecord,
};
use tracing::{error, warn};

pub fn record_key(code: &str) -> String {
    format!("{VERIFICATION_PREFIX}{code}")
}

/// Serialize `record` and write it under its namespaced key.
pub async fn save_record<S: EphemeralStore>(
    store: &S,
    record: &VerificationRecord,
    ttl_secs: u64,
) -> AppResult<()> {
    let value = serde_json::to_string(record)?;
    store.put(&record_key(&record.code), &value, ttl_secs).await
}

/// Every live record under `prefix`, with the prefix stripped into `key`.
///
/// Entries that vanish between listing and reading, or that hold corrupt JSON,
/// are skipped.
pub async fn list_records<S: EphemeralStore>(
    store: &S,
    prefix: &str,
) -> AppResult<Vec<VerificationRecord>> {
    let keys = store.list(prefix).await.inspect_err(|e| {
        error!("listing keys under {prefix} failed: {e}");
    })?;

    let mut out = Vec::with_capacity(keys.len());
    for entry in keys {
        let Some(raw) = store.get(&entry.name).await? else {
            continue;
        };
        match serde_json::from_str::<VerificationRecord>(&raw) {
            Ok(mut record) => {
                let bare = entry.name.strip_prefix(prefix).unwrap_or(&entry.name);
                record.key = Some(bare.to_string());
                out.push(record);
            }
            Err(source) => {
                let err = AppError::ListingDeserialize {
                    key: entry.name,
                    source,
                };
                warn!("{err}");
            }
        }
    }
    Ok(out)
}
