//! Database schema migrations (idempotent).

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Open the configured database and create the schema.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let result = apply_schema(&pool).await;
    pool.close().await;
    result
}

/// Create the `pages` table and its indexes on an open pool.
///
/// Safe to run on every startup.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pages (
            id TEXT PRIMARY KEY,
            doc_id TEXT NOT NULL,
            page_id TEXT NOT NULL,
            doc_name TEXT NOT NULL,
            page_name TEXT NOT NULL,
            url TEXT NOT NULL DEFAULT '',
            content TEXT NOT NULL,
            content_type TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            extracted_at INTEGER NOT NULL,
            content_length INTEGER NOT NULL,
            mirror_file TEXT,
            UNIQUE(doc_id, page_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_pages_doc_id ON pages(doc_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_pages_extracted_at ON pages(extracted_at DESC)")
        .execute(pool)
        .await?;

    Ok(())
}
