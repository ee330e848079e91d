//! Cache status for one document.
//!
//! `docmirror status <doc>` shows how many pages are cached and which were
//! extracted most recently, so a user can tell whether syncs are landing.

use anyhow::Result;

use doc_mirror_core::models::CachedPageRecord;
use doc_mirror_core::store::PageStore;

use crate::config::Config;
use crate::get::format_ms_iso;
use crate::sqlite_store::SqliteStore;
use crate::{db, migrate};

pub struct DocStatus {
    pub doc_id: String,
    pub cached_pages: i64,
    pub recent: Vec<CachedPageRecord>,
}

pub async fn doc_status(store: &dyn PageStore, doc_id: &str, limit: i64) -> Result<DocStatus> {
    Ok(DocStatus {
        doc_id: doc_id.to_string(),
        cached_pages: store.count(doc_id).await?,
        recent: store.list_recent(doc_id, limit).await?,
    })
}

/// Run the status command: query the cache and print a summary.
pub async fn run_status(config: &Config, doc_id: &str, limit: i64) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate::apply_schema(&pool).await?;
    let store = SqliteStore::new(pool);
    let result = doc_status(&store, doc_id, limit).await;
    store.close().await;
    let status = result?;

    println!("doc-mirror — cache status");
    println!("=========================");
    println!();
    println!("  Database:     {}", config.db.path.display());
    println!("  Mirror:       {}", config.mirror.output_dir.display());
    println!("  Document:     {}", status.doc_id);
    println!("  Cached pages: {}", status.cached_pages);

    if !status.recent.is_empty() {
        println!();
        println!("  Recently extracted:");
        for r in &status.recent {
            println!(
                "    {}  {:<40}  {:>7} chars  {}",
                format_ms_iso(r.extracted_at),
                r.page_name,
                r.content_length(),
                r.mirror_file.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_mirror_core::store::memory::InMemoryStore;

    #[tokio::test]
    async fn empty_document_has_no_pages() {
        let store = InMemoryStore::new();
        let status = doc_status(&store, "doc-1", 5).await.unwrap();
        assert_eq!(status.cached_pages, 0);
        assert!(status.recent.is_empty());
    }
}
