//! Local key-value persistence for pmplan
//!
//! Values are opaque strings addressed by string keys. The SQLite-backed
//! [`Database`] is what the CLI uses; [`MemoryStore`] serves tests and
//! embedders that keep everything in process.

pub mod error;
pub mod kv;
pub mod repos;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub use error::{Error, Result};
pub use kv::{KeyValueStore, MemoryStore};
pub use repos::entries::EntriesRepo;

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection from a file path
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Io(format!("Failed to create database directory: {}", e)))?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::migrate(&pool).await?;
        tracing::debug!(path = %db_path.display(), "Opened plan database");

        Ok(Self { pool })
    }

    /// Create an in-memory database
    ///
    /// Limited to a single connection that is never recycled; every new
    /// SQLite memory connection sees its own empty database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(|e| Error::Migration(e.to_string()))
    }

    /// Get the default database path (~/.cache/pmplan/pmplan.db)
    pub fn default_path() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| Error::Io("Could not determine cache directory".to_string()))?;
        Ok(cache_dir.join("pmplan").join("pmplan.db"))
    }

    /// Create a database connection at the default path
    pub async fn default() -> Result<Self> {
        Self::new(Self::default_path()?).await
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the key-value entries repository
    pub fn entries(&self) -> EntriesRepo {
        EntriesRepo::new(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_database_creation() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("test.db");

        let _db = Database::new(&db_path).await.unwrap();
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_database_migrations() {
        let db = Database::in_memory().await.unwrap();

        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='kv_entries'",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(result.0, 1);
    }

    #[tokio::test]
    async fn test_reopen_keeps_entries() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        {
            let db = Database::new(&db_path).await.unwrap();
            db.entries().set("manager", "Ada").await.unwrap();
        }

        let db = Database::new(&db_path).await.unwrap();
        assert_eq!(
            db.entries().get("manager").await.unwrap(),
            Some("Ada".to_string())
        );
    }
}
