//! Connection pool setup.

use crate::error::{DatabaseError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

const MAX_CONNECTIONS: u32 = 5;

/// Open (creating if missing) the database file at `path`.
pub async fn open_pool(path: &Path) -> Result<Pool<Sqlite>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await
        .map_err(|e| DatabaseError::Open(format!("{}: {e}", path.display())))?;

    tracing::info!("Database pool created at {}", path.display());
    Ok(pool)
}

/// Open a private in-memory database.
///
/// Every connection to `:memory:` is a separate database, so the pool is
/// held to a single connection that never expires.
pub async fn memory_pool() -> Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?;

    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(|e| DatabaseError::Open(format!("in-memory database: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_creates_parent_directory() {
        let tmp = TempDir::new().expect("temp dir");
        let path = tmp.path().join("nested").join("applications.db");

        let pool = open_pool(&path).await.expect("open pool");
        sqlx::query("SELECT 1").execute(&pool).await.expect("query");
        pool.close().await;

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_memory_pool_shares_one_database() {
        let pool = memory_pool().await.expect("memory pool");
        sqlx::query("CREATE TABLE t (x INTEGER)")
            .execute(&pool)
            .await
            .expect("create");
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM t")
            .fetch_one(&pool)
            .await
            .expect("table visible");
        assert_eq!(count, 0);
    }
}
