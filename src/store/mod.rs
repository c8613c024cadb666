//! Ephemeral key-value store: every entry carries a non-renewable expiry.

use crate::error::{AppError, AppResult};
use chrono::Utc;
use sqlx::SqlitePool;
use std::{future::Future, time::Duration};
use tracing::{debug, warn};

pub mod records;

/// Namespace shared by every key the pipeline writes.
pub const VERIFICATION_PREFIX: &str = "verification:";

pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(100);

/// Key as returned by [`EphemeralStore::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    pub name: String,
}

/// Capability set the pipeline and API rely on. Any key-value engine with
/// per-key TTLs can provide it.
pub trait EphemeralStore: Clone + Send + Sync + 'static {
    /// Write `value` under `key`, replacing any previous value, expiring after `ttl_secs`.
    fn put(&self, key: &str, value: &str, ttl_secs: u64) -> impl Future<Output = AppResult<()>> + Send;

    /// Live keys starting with `prefix`.
    fn list(&self, prefix: &str) -> impl Future<Output = AppResult<Vec<KeyEntry>>> + Send;

    /// Live value under `key`.
    fn get(&self, key: &str) -> impl Future<Output = AppResult<Option<String>>> + Send;
}

/// SQLite-backed store. Expired rows are hidden at once and deleted by
/// [`SqliteStore::purge_expired`].
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Delete expired rows; returns how many were removed.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let res = sqlx::query("DELETE FROM kv WHERE expires_at <= ?")
            .bind(now_millis())
            .execute(&self.pool)
            .await
            .map_err(AppError::StoreWrite)?;
        Ok(res.rows_affected())
    }

    /// Periodically purge expired rows until the runtime shuts down.
    /// Intervals below [`MIN_SWEEP_INTERVAL`] are raised to it.
    pub fn spawn_sweeper(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        let every = every.max(MIN_SWEEP_INTERVAL);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(every);
            loop {
                tick.tick().await;
                match store.purge_expired().await {
                    Ok(0) => {}
                    Ok(n) => debug!("purged {n} expired keys"),
                    Err(e) => warn!("sweeper error: {e}"),
                }
            }
        })
    }
}

impl EphemeralStore for SqliteStore {
    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> AppResult<()> {
        let ttl_ms = i64::try_from(ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        let expires_at = now_millis().saturating_add(ttl_ms);
        sqlx::query(
            "INSERT INTO kv (key, value, expires_at) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at",
        )
        .bind(key)
        .bind(value)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(AppError::StoreWrite)?;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> AppResult<Vec<KeyEntry>> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT key FROM kv WHERE instr(key, ?) = 1 AND expires_at > ? ORDER BY key",
        )
        .bind(prefix)
        .bind(now_millis())
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::StoreRead)?;
        Ok(names.into_iter().map(|name| KeyEntry { name }).collect())
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        sqlx::query_scalar("SELECT value FROM kv WHERE key = ? AND expires_at > ?")
            .bind(key)
            .bind(now_millis())
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::StoreRead)
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
