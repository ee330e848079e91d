//! Cached page retrieval.
//!
//! Reads one page record from the cache. Used by `docmirror get`.

use anyhow::{bail, Result};
use serde::Serialize;

use doc_mirror_core::models::CachedPageRecord;
use doc_mirror_core::store::PageStore;

use crate::config::Config;
use crate::{db, migrate};
use crate::sqlite_store::SqliteStore;

/// Cached page plus its derived fields, shaped for display or JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse {
    #[serde(flatten)]
    pub record: CachedPageRecord,
    pub content_length: i64,
    pub extracted_at_iso: String,
}

/// Look up one cached page in any store.
pub async fn get_page(store: &dyn PageStore, doc_id: &str, page_id: &str) -> Result<PageResponse> {
    let Some(record) = store.get(doc_id, page_id).await? else {
        bail!("page not cached: {}/{}", doc_id, page_id);
    };
    Ok(PageResponse {
        content_length: record.content_length(),
        extracted_at_iso: format_ms_iso(record.extracted_at),
        record,
    })
}

/// CLI entry point: print one cached page to stdout.
pub async fn run_get(config: &Config, doc_id: &str, page_id: &str, json: bool) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate::apply_schema(&pool).await?;
    let store = SqliteStore::new(pool);
    let result = get_page(&store, doc_id, page_id).await;
    store.close().await;
    let page = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    let r = &page.record;
    println!("--- Page ---");
    println!("doc:            {} ({})", r.doc_name, r.doc_id);
    println!("page:           {} ({})", r.page_name, r.page_id);
    println!("url:            {}", r.url);
    println!("content_type:   {}", r.content_type);
    println!("created_at:     {}", r.created_at);
    println!("updated_at:     {}", r.updated_at);
    println!("extracted_at:   {}", page.extracted_at_iso);
    println!("content_length: {}", page.content_length);
    if let Some(ref file) = r.mirror_file {
        println!("mirror_file:    {}", file);
    }
    println!();
    println!("--- Content ---");
    println!("{}", r.content);

    Ok(())
}

pub(crate) fn format_ms_iso(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ms.to_string())
}
