//! SQLite-backed [`PageStore`] implementation.
//!
//! One row per `(doc_id, page_id)` in the `pages` table. The primary key
//! is `"{doc_id}-{page_id}"`; `UNIQUE(doc_id, page_id)` makes the upsert
//! an overwrite.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use doc_mirror_core::models::CachedPageRecord;
use doc_mirror_core::store::PageStore;

/// SQLite implementation of the [`PageStore`] trait.
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

    /// Close the underlying pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

const SELECT_COLUMNS: &str = "doc_id, page_id, doc_name, page_name, url, content, content_type, \
     created_at, updated_at, extracted_at, mirror_file";

fn row_to_record(row: &SqliteRow) -> CachedPageRecord {
    CachedPageRecord {
        doc_id: row.get("doc_id"),
        page_id: row.get("page_id"),
        doc_name: row.get("doc_name"),
        page_name: row.get("page_name"),
        url: row.get("url"),
        content: row.get("content"),
        content_type: row.get("content_type"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        extracted_at: row.get("extracted_at"),
        mirror_file: row.get("mirror_file"),
    }
}

#[async_trait]
impl PageStore for SqliteStore {
    async fn get(&self, doc_id: &str, page_id: &str) -> Result<Option<CachedPageRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM pages WHERE doc_id = ? AND page_id = ?",
            SELECT_COLUMNS
        ))
        .bind(doc_id)
        .bind(page_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_record))
    }

    async fn upsert(&self, record: &CachedPageRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO pages (id, doc_id, page_id, doc_name, page_name, url, content,
                               content_type, created_at, updated_at, extracted_at,
                               content_length, mirror_file)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(doc_id, page_id) DO UPDATE SET
                doc_name = excluded.doc_name,
                page_name = excluded.page_name,
                url = excluded.url,
                content = excluded.content,
                content_type = excluded.content_type,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                extracted_at = excluded.extracted_at,
                content_length = excluded.content_length,
                mirror_file = excluded.mirror_file
            "#,
        )
        .bind(record.key())
        .bind(&record.doc_id)
        .bind(&record.page_id)
        .bind(&record.doc_name)
        .bind(&record.page_name)
        .bind(&record.url)
        .bind(&record.content)
        .bind(&record.content_type)
        .bind(&record.created_at)
        .bind(&record.updated_at)
        .bind(record.extracted_at)
        .bind(record.content_length())
        .bind(&record.mirror_file)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_recent(&self, doc_id: &str, limit: i64) -> Result<Vec<CachedPageRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM pages WHERE doc_id = ? ORDER BY extracted_at DESC LIMIT ?",
            SELECT_COLUMNS
        ))
        .bind(doc_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_record).collect())
    }

    async fn count(&self, doc_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pages WHERE doc_id = ?")
            .bind(doc_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::{db, migrate};
    use tempfile::TempDir;

    fn record(page_id: &str, content: &str, extracted_at: i64) -> CachedPageRecord {
        CachedPageRecord {
            doc_id: "doc-1".to_string(),
            page_id: page_id.to_string(),
            doc_name: "Handbook".to_string(),
            page_name: format!("Page {}", page_id),
            url: format!("https://example.com/{}", page_id),
            content: content.to_string(),
            content_type: "canvas".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-02T00:00:00Z".to_string(),
            extracted_at,
            mirror_file: Some(format!("page-{}.md", page_id)),
        }
    }

    async fn open_store(tmp: &TempDir) -> SqliteStore {
        let config = Config::in_dir(tmp.path());
        let pool = db::connect(&config).await.unwrap();
        migrate::apply_schema(&pool).await.unwrap();
        SqliteStore::new(pool)
    }

    #[tokio::test]
    async fn upsert_keeps_one_row_per_key() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        store.upsert(&record("p1", "first version", 100)).await.unwrap();
        store.upsert(&record("p1", "second version", 200)).await.unwrap();

        assert_eq!(store.count("doc-1").await.unwrap(), 1);
        let got = store.get("doc-1", "p1").await.unwrap().unwrap();
        assert_eq!(got.content, "second version");
        assert_eq!(got.extracted_at, 200);
        assert_eq!(got.mirror_file.as_deref(), Some("page-p1.md"));

        let (id, length): (String, i64) =
            sqlx::query_as("SELECT id, content_length FROM pages WHERE page_id = 'p1'")
                .fetch_one(store.pool())
                .await
                .unwrap();
        assert_eq!(id, "doc-1-p1");
        assert_eq!(length, "second version".len() as i64);
        store.close().await;
    }

    #[tokio::test]
    async fn list_recent_orders_by_extraction() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        store.upsert(&record("a", "alpha body", 10)).await.unwrap();
        store.upsert(&record("b", "beta body", 30)).await.unwrap();
        store.upsert(&record("c", "gamma body", 20)).await.unwrap();

        let recent = store.list_recent("doc-1", 10).await.unwrap();
        let ids: Vec<&str> = recent.iter().map(|r| r.page_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert!(store.get("doc-2", "a").await.unwrap().is_none());
        store.close().await;
    }

    #[tokio::test]
    async fn schema_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        migrate::apply_schema(store.pool()).await.unwrap();
        store.close().await;
    }
}
