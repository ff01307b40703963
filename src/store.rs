// src/store.rs
//! Persistence gateway. One SQLite table keyed by an auto-assigned id with
//! `url` enforced unique; re-runs overwrite matching rows in place and never
//! delete anything.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;

use crate::sources::types::CanonicalPosting;

/// One persisted row as the dashboard reads it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, FromRow)]
pub struct StoredPosting {
    pub title: String,
    pub company: String,
    pub url: String,
    pub date_posted: String,
    pub location: String,
    pub source: String,
}

#[derive(Clone)]
pub struct JobStore {
    pool: SqlitePool,
}

impl JobStore {
    /// Open (or create) the store at the given connection string, e.g.
    /// `sqlite:jobs.db?mode=rwc` or `sqlite::memory:`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .with_context(|| format!("opening job store at {database_url}"))?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// In-memory store for tests.
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT,
                company TEXT,
                url TEXT UNIQUE,
                date_posted TEXT,
                location TEXT,
                source TEXT,
                fetched_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("creating jobs table")?;

        Ok(())
    }

    /// Upsert each posting by url: existing rows get their mutable fields
    /// overwritten and their fetch timestamp refreshed, new rows get a fresh
    /// identity. Returns the count of records processed (upserts are
    /// indistinguishable from inserts to the caller). Safe to repeat with
    /// overlapping data across runs.
    pub async fn upsert_all(&self, postings: &[CanonicalPosting]) -> Result<usize> {
        let mut processed = 0usize;
        for posting in postings {
            if posting.url.is_empty() {
                // Cannot be keyed; the dedup stage drops these already.
                continue;
            }
            sqlx::query(
                r#"
                INSERT INTO jobs (title, company, url, date_posted, location, source)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(url) DO UPDATE SET
                    title = excluded.title,
                    company = excluded.company,
                    date_posted = excluded.date_posted,
                    location = excluded.location,
                    source = excluded.source,
                    fetched_at = CURRENT_TIMESTAMP
                "#,
            )
            .bind(&posting.title)
            .bind(&posting.company)
            .bind(&posting.url)
            .bind(&posting.date_posted)
            .bind(&posting.location)
            .bind(&posting.source)
            .execute(&self.pool)
            .await
            .with_context(|| format!("upserting posting {}", posting.url))?;
            processed += 1;
        }
        Ok(processed)
    }

    /// All persisted postings, most recently fetched first.
    pub async fn recent(&self) -> Result<Vec<StoredPosting>> {
        sqlx::query_as::<_, StoredPosting>(
            r#"
            SELECT title, company, url, date_posted, location, source
            FROM jobs
            ORDER BY fetched_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("reading stored postings")
    }

    /// Close the underlying pool; subsequent queries fail. Used for graceful
    /// shutdown and for exercising the persistence failure path.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Total stored rows.
    pub async fn count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.pool)
            .await
            .context("counting stored postings")?;
        Ok(row.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(url: &str, title: &str) -> CanonicalPosting {
        CanonicalPosting {
            title: title.to_string(),
            company: "Acme".to_string(),
            url: url.to_string(),
            date_posted: "2025-01-02".to_string(),
            location: "Remote".to_string(),
            description: Some("never stored".to_string()),
            source: "Test".to_string(),
            flags: Vec::new(),
        }
    }

    #[tokio::test]
    async fn upsert_overwrites_in_place() {
        let store = JobStore::in_memory().await.unwrap();

        let n = store.upsert_all(&[posting("https://x/1", "Old title")]).await.unwrap();
        assert_eq!(n, 1);

        let n = store.upsert_all(&[posting("https://x/1", "New title")]).await.unwrap();
        assert_eq!(n, 1);

        assert_eq!(store.count().await.unwrap(), 1);
        let rows = store.recent().await.unwrap();
        assert_eq!(rows[0].title, "New title");
    }

    #[tokio::test]
    async fn empty_url_is_never_persisted() {
        let store = JobStore::in_memory().await.unwrap();
        let n = store
            .upsert_all(&[posting("", "ghost"), posting("https://x/1", "real")])
            .await
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn recent_orders_newest_first() {
        let store = JobStore::in_memory().await.unwrap();
        store
            .upsert_all(&[posting("https://x/1", "first"), posting("https://x/2", "second")])
            .await
            .unwrap();
        let rows = store.recent().await.unwrap();
        // same timestamp within one run: identity breaks the tie, newest first
        assert_eq!(rows[0].url, "https://x/2");
        assert_eq!(rows[1].url, "https://x/1");
    }
}
