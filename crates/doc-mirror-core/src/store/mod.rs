//! Storage abstraction for the page cache.
//!
//! The [`PageStore`] trait holds one [`CachedPageRecord`] per
//! `(doc_id, page_id)`. Upserts overwrite; nothing in the mirror pipeline
//! deletes records.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::CachedPageRecord;

/// Abstract cache backend for extracted pages.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`get`](PageStore::get) | Look up the record for one page |
/// | [`upsert`](PageStore::upsert) | Insert or replace the record for its key |
/// | [`list_recent`](PageStore::list_recent) | Records of a document, newest extraction first |
/// | [`count`](PageStore::count) | Number of records for a document |
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Retrieve the record for `(doc_id, page_id)`, if any.
    async fn get(&self, doc_id: &str, page_id: &str) -> Result<Option<CachedPageRecord>>;

    /// Insert the record, replacing any existing record with the same key.
    async fn upsert(&self, record: &CachedPageRecord) -> Result<()>;

    /// Records of one document ordered by `extracted_at` descending.
    async fn list_recent(&self, doc_id: &str, limit: i64) -> Result<Vec<CachedPageRecord>>;

    /// Number of cached pages for one document.
    async fn count(&self, doc_id: &str) -> Result<i64>;
}
