//! Repository for key-value entries

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::kv::KeyValueStore;
use crate::Result;

const UPSERT: &str = "INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, ?3)
     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";

/// SQLite-backed key-value entries
#[derive(Clone)]
pub struct EntriesRepo {
    pool: SqlitePool,
}

impl EntriesRepo {
    /// Create a new repository instance
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for EntriesRepo {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_entries WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(UPSERT)
            .bind(key)
            .bind(value)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        tracing::trace!(key, bytes = value.len(), "Stored entry");
        Ok(())
    }

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        // Dropping the transaction without commit rolls it back
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        for (key, value) in entries {
            sqlx::query(UPSERT)
                .bind(*key)
                .bind(*value)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::trace!(count = entries.len(), "Stored entries");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM kv_entries WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT key FROM kv_entries ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|(key,)| key).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_set_overwrites() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.entries();

        repo.set("pmplan.manager", "Ada").await.unwrap();
        repo.set("pmplan.manager", "Grace").await.unwrap();

        assert_eq!(
            repo.get("pmplan.manager").await.unwrap(),
            Some("Grace".to_string())
        );
        assert_eq!(repo.keys().await.unwrap(), vec!["pmplan.manager"]);
    }

    #[tokio::test]
    async fn test_missing_key() {
        let db = Database::in_memory().await.unwrap();
        assert_eq!(db.entries().get("nope").await.unwrap(), None);
        assert!(!db.entries().remove("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.entries();

        repo.set("a", "1").await.unwrap();
        assert!(repo.remove("a").await.unwrap());
        assert_eq!(repo.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_many() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.entries();
        repo.set("pmplan.plan", "old").await.unwrap();

        repo.set_many(&[("pmplan.plan", "header"), ("pmplan.sections", "{}")])
            .await
            .unwrap();

        assert_eq!(
            repo.get("pmplan.plan").await.unwrap(),
            Some("header".to_string())
        );
        assert_eq!(
            repo.keys().await.unwrap(),
            vec!["pmplan.plan", "pmplan.sections"]
        );
    }

    #[tokio::test]
    async fn test_set_many_closed_pool_writes_nothing() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.entries();
        repo.set("a", "1").await.unwrap();
        db.pool().close().await;

        assert!(repo.set_many(&[("a", "2"), ("b", "3")]).await.is_err());
    }
}
