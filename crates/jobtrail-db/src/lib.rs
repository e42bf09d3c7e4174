//! Jobtrail Database Layer
//!
//! `SQLite` record store for tracked job applications, built on `SQLx` with
//! embedded migrations.
//!
//! # Architecture
//!
//! - **Applications** ([`applications`]): listing rows and their status lifecycle
//! - **Stats** ([`stats`]): per-day counters and windowed summaries
//! - **Migrations** ([`migrations`]): versioned schema embedded at compile time
//!
//! # Example
//!
//! ```ignore
//! use jobtrail_db::{applications, Database};
//!
//! let db = Database::open(&config.paths.database_path()?).await?;
//! db.run_migrations().await?;
//! let id = applications::upsert_if_absent(db.pool(), &listing, today, 7).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod applications;
pub mod connection;
pub mod error;
pub mod migrations;
#[allow(missing_docs)]
pub mod stats;

// Re-export commonly used types
pub use applications::ApplicationRecord;
pub use error::{DatabaseError, Result};
pub use stats::{DailyStats, StatsDelta, StatsSummary};

use std::path::Path;

/// Handle to the record store.
///
/// Cloning is cheap; clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: sqlx::Pool<sqlx::Sqlite>,
}

impl Database {
    /// Open the database file at `path`, creating it if needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let pool = connection::open_pool(path.as_ref()).await?;
        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    pub async fn in_memory() -> Result<Self> {
        let pool = connection::memory_pool().await?;
        Ok(Self { pool })
    }

    /// Open the file at `path` and bring its schema up to date.
    pub async fn open_and_migrate(path: impl AsRef<Path>) -> Result<Self> {
        let db = Self::open(path).await?;
        db.run_migrations().await?;
        Ok(db)
    }

    /// Apply pending migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Number of applied migrations.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(&self.pool).await
    }

    /// The underlying `SQLx` pool, for the query functions.
    #[must_use]
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        &self.pool
    }

    /// Close all connections.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::debug!("Database pool closed");
    }
}
