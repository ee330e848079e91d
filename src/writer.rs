//! Dual-sink writer: persist one extracted page to the markdown mirror and
//! then to the page cache.
//!
//! Order is fixed: mirror file first, cache record second. The two writes
//! share no transaction. If the cache upsert still fails after
//! `cache_write_attempts` tries, the page is reported as failed and the
//! mirror file is left one extraction ahead of the cache. The next run sees
//! a stale (or missing) record and extracts the page again.

use anyhow::{anyhow, Result};
use chrono::{SecondsFormat, Utc};
use std::path::PathBuf;

use doc_mirror_core::frontmatter::{compose_document, PageFrontmatter};
use doc_mirror_core::models::{CachedPageRecord, Page};
use doc_mirror_core::store::PageStore;

use crate::mirror::MirrorDir;

/// The document a page belongs to.
#[derive(Debug, Clone)]
pub struct DocContext {
    pub doc_id: String,
    pub doc_name: String,
}

/// What [`DualSinkWriter::write`] did with a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// First record for this key.
    Created(PathBuf),
    /// Replaced an existing record.
    Updated(PathBuf),
    /// Content was empty or whitespace.
    SkippedEmpty,
    /// Trimmed content shorter than the minimum.
    SkippedTooShort,
}

/// A page ready to be written, with its resolved mirror file name.
pub struct PageWrite<'a> {
    pub page: &'a Page,
    pub parent_name: Option<&'a str>,
    pub filename: &'a str,
    pub content: &'a str,
    /// Whether a cache record existed before this extraction.
    pub existed: bool,
}

pub struct DualSinkWriter<'a> {
    mirror: &'a MirrorDir,
    store: &'a dyn PageStore,
    min_content_length: usize,
    cache_write_attempts: u32,
}

impl<'a> DualSinkWriter<'a> {
    pub fn new(
        mirror: &'a MirrorDir,
        store: &'a dyn PageStore,
        min_content_length: usize,
        cache_write_attempts: u32,
    ) -> Self {
        Self {
            mirror,
            store,
            min_content_length,
            cache_write_attempts: cache_write_attempts.max(1),
        }
    }

    pub async fn write(&self, doc: &DocContext, item: PageWrite<'_>) -> Result<WriteOutcome> {
        let trimmed = item.content.trim();
        if trimmed.is_empty() {
            return Ok(WriteOutcome::SkippedEmpty);
        }
        if trimmed.chars().count() < self.min_content_length {
            return Ok(WriteOutcome::SkippedTooShort);
        }

        let page = item.page;
        let now = Utc::now();
        let meta = PageFrontmatter {
            title: page.name.clone(),
            page_id: page.id.clone(),
            doc_id: doc.doc_id.clone(),
            doc_name: doc.doc_name.clone(),
            url: page.browser_link.clone(),
            content_type: page.content_type.clone(),
            parent_page_id: page.parent_id.clone(),
            parent_page_name: item.parent_name.map(str::to_string),
            created_at: page.created_at.clone(),
            updated_at: page.updated_at.clone(),
            extracted_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        let path = self
            .mirror
            .write(item.filename, &compose_document(&meta, item.content))?;

        let record = CachedPageRecord {
            doc_id: doc.doc_id.clone(),
            page_id: page.id.clone(),
            doc_name: doc.doc_name.clone(),
            page_name: page.name.clone(),
            url: page.browser_link.clone(),
            content: item.content.to_string(),
            content_type: page.content_type.clone(),
            created_at: page.created_at.clone(),
            updated_at: page.updated_at.clone(),
            extracted_at: now.timestamp_millis(),
            mirror_file: Some(item.filename.to_string()),
        };
        self.upsert_with_retry(&record, &path).await?;

        Ok(if item.existed {
            WriteOutcome::Updated(path)
        } else {
            WriteOutcome::Created(path)
        })
    }

    async fn upsert_with_retry(&self, record: &CachedPageRecord, path: &std::path::Path) -> Result<()> {
        let mut last_err = None;
        for attempt in 1..=self.cache_write_attempts {
            match self.store.upsert(record).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        page_id = %record.page_id,
                        attempt,
                        error = %e,
                        "cache upsert failed"
                    );
                    last_err = Some(e);
                }
            }
        }

        tracing::warn!(
            page_id = %record.page_id,
            file = %path.display(),
            "mirror file is ahead of the page cache"
        );
        let cause = last_err.unwrap_or_else(|| anyhow!("no upsert attempted"));
        Err(cause.context(format!(
            "mirror file {} written but cache upsert failed",
            path.display()
        )))
    }
}
