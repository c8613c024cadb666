//! Database helpers: migrations and path handling.

use sqlx::SqlitePool;
use std::path::Path;

/// Create the key-value table if absent.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            expires_at INTEGER NOT NULL
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS kv_expires_at ON kv (expires_at)")
        .execute(pool)
        .await?;
    Ok(())
}

/// Ensure the SQLite file and its parent folder exist for a sqlx URL.
pub fn ensure_sqlite_path(db_url: &str) -> String {
    let Some(path_part) = db_url.strip_prefix("sqlite://") else {
        return db_url.to_string();
    };
    let path_only = path_part.split('?').next().unwrap_or_default();
    if path_only.is_empty() || path_only == ":memory:" {
        return db_url.to_string();
    }
    let p = Path::new(path_only);
    if let Some(parent) = p.parent().filter(|p| !p.as_os_str().is_empty()) {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(p);
    db_url.to_string()
}
