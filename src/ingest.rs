//! Sync pipeline orchestration.
//!
//! One pass over a document:
//!
//! ```text
//! list pages ─▶ hierarchy filter ─▶ for each page, in order:
//!     staleness ─▶ rename reconcile ─▶ fetch (retry) ─▶ mirror file ─▶ cache
//!     pause (between pages)
//! ```
//!
//! Pages are processed strictly one at a time. A page's failure is recorded
//! in its [`PageOutcome`] and never aborts the run; only setup failures
//! (mirror directory, database, document listing) are fatal.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

use doc_mirror_core::filter::filter_pages;
use doc_mirror_core::models::Page;
use doc_mirror_core::naming::mirror_filename;
use doc_mirror_core::staleness::{classify, Staleness};
use doc_mirror_core::store::PageStore;

use crate::config::Config;
use crate::db;
use crate::fetch::{fetch_with_retry, RetryPolicy};
use crate::migrate;
use crate::mirror::MirrorDir;
use crate::pacer::Pacer;
use crate::progress::{SyncProgressEvent, SyncProgressReporter};
use crate::source_http::HttpPageSource;
use crate::sqlite_store::SqliteStore;
use crate::traits::PageSource;
use crate::writer::{DocContext, DualSinkWriter, PageWrite, WriteOutcome};

/// Per-run switches supplied by the CLI.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Re-extract every page regardless of the cache.
    pub force: bool,
    /// Process at most this many pages after filtering.
    pub limit: Option<usize>,
    pub exclude_subpages: bool,
    pub include_hidden: bool,
    /// Overrides `mirror.min_content_length`.
    pub min_content_length: Option<usize>,
}

/// Final state of one page in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "error", rename_all = "snake_case")]
pub enum PageOutcome {
    SkippedUpToDate,
    SkippedEmpty,
    SkippedTooShort,
    Created,
    Updated,
    Errored(String),
}

impl PageOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            PageOutcome::SkippedUpToDate => "up to date",
            PageOutcome::SkippedEmpty => "skipped (empty)",
            PageOutcome::SkippedTooShort => "skipped (too short)",
            PageOutcome::Created => "created",
            PageOutcome::Updated => "updated",
            PageOutcome::Errored(_) => "errored",
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            PageOutcome::SkippedUpToDate | PageOutcome::SkippedEmpty | PageOutcome::SkippedTooShort
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    pub page_id: String,
    pub page_name: String,
    #[serde(flatten)]
    pub outcome: PageOutcome,
}

/// Counts and per-page outcomes of one sync run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub doc_id: String,
    pub doc_name: String,
    pub output_dir: PathBuf,
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    pub errored: u64,
    /// Pages removed by the hierarchy filter before processing.
    pub filtered_out: u64,
    pub pages: Vec<PageReport>,
}

impl SyncReport {
    fn record(&mut self, page_id: &str, page_name: &str, outcome: PageOutcome) {
        match &outcome {
            PageOutcome::Created => self.created += 1,
            PageOutcome::Updated => self.updated += 1,
            PageOutcome::Errored(_) => self.errored += 1,
            _ => self.skipped += 1,
        }
        self.pages.push(PageReport {
            page_id: page_id.to_string(),
            page_name: page_name.to_string(),
            outcome,
        });
    }

    /// Outcome recorded for `page_id`, if the page was processed.
    pub fn outcome_of(&self, page_id: &str) -> Option<&PageOutcome> {
        self.pages
            .iter()
            .find(|p| p.page_id == page_id)
            .map(|p| &p.outcome)
    }
}

/// Sync one document using the configured HTTP source and SQLite cache.
pub async fn run_sync(
    config: &Config,
    doc_id: &str,
    opts: &SyncOptions,
    reporter: &dyn SyncProgressReporter,
) -> Result<SyncReport> {
    let source = HttpPageSource::from_config(&config.source)?;
    MirrorDir::create(&config.mirror.output_dir)?;

    let pool = db::connect(config).await?;
    migrate::apply_schema(&pool).await?;
    let store = SqliteStore::new(pool);

    let result = run_sync_with_source(config, &source, &store, doc_id, opts, reporter).await;
    store.close().await;
    result
}

/// Sync one document against any [`PageSource`] and [`PageStore`].
pub async fn run_sync_with_source(
    config: &Config,
    source: &dyn PageSource,
    store: &dyn PageStore,
    doc_id: &str,
    opts: &SyncOptions,
    reporter: &dyn SyncProgressReporter,
) -> Result<SyncReport> {
    let mirror = MirrorDir::create(&config.mirror.output_dir)?;

    let doc_name = source
        .document_name(doc_id)
        .await
        .with_context(|| format!("Failed to fetch document {}", doc_id))?;

    reporter.report(SyncProgressEvent::Discovering {
        doc_id: doc_id.to_string(),
    });
    let pages = source
        .list_pages(doc_id)
        .await
        .with_context(|| format!("Failed to list pages of document {}", doc_id))?;

    let parent_names: HashMap<String, String> = pages
        .iter()
        .map(|p| (p.id.clone(), p.name.clone()))
        .collect();

    let (mut candidates, stats) = filter_pages(pages, opts.exclude_subpages, opts.include_hidden);
    tracing::info!(doc_id, %stats, "hierarchy filter applied");
    if let Some(limit) = opts.limit {
        candidates.truncate(limit);
    }
    reporter.report(SyncProgressEvent::Filtered {
        stats,
        planned: candidates.len(),
    });

    let doc = DocContext {
        doc_id: doc_id.to_string(),
        doc_name: doc_name.clone(),
    };
    let min_len = opts
        .min_content_length
        .unwrap_or(config.mirror.min_content_length);
    let ctx = PageContext {
        doc: &doc,
        source,
        store,
        mirror: &mirror,
        writer: DualSinkWriter::new(&mirror, store, min_len, config.fetch.cache_write_attempts),
        policy: RetryPolicy::from_config(&config.fetch),
        force: opts.force,
    };
    let pacer = Pacer::new(config.fetch.page_delay());

    let mut report = SyncReport {
        doc_id: doc_id.to_string(),
        doc_name,
        output_dir: mirror.root().to_path_buf(),
        created: 0,
        updated: 0,
        skipped: 0,
        errored: 0,
        filtered_out: stats.removed() as u64,
        pages: Vec::with_capacity(candidates.len()),
    };

    let total = candidates.len();
    for (i, page) in candidates.iter().enumerate() {
        let parent_name = page
            .parent_id
            .as_ref()
            .and_then(|id| parent_names.get(id))
            .map(String::as_str);

        let outcome = ctx.process(page, parent_name).await;
        tracing::debug!(page_id = %page.id, outcome = outcome.label(), "page processed");

        reporter.report(SyncProgressEvent::Page {
            n: i + 1,
            total,
            page_id: page.id.clone(),
            page_name: page.name.clone(),
            outcome: outcome.clone(),
        });
        report.record(&page.id, &page.name, outcome);

        if i + 1 < total {
            pacer.pause().await;
        }
    }

    tracing::info!(
        doc_id,
        created = report.created,
        updated = report.updated,
        skipped = report.skipped,
        errored = report.errored,
        "sync finished"
    );
    Ok(report)
}

/// Everything needed to carry one page from candidate to final state.
struct PageContext<'a> {
    doc: &'a DocContext,
    source: &'a dyn PageSource,
    store: &'a dyn PageStore,
    mirror: &'a MirrorDir,
    writer: DualSinkWriter<'a>,
    policy: RetryPolicy,
    force: bool,
}

impl PageContext<'_> {
    async fn process(&self, page: &Page, parent_name: Option<&str>) -> PageOutcome {
        let doc_id = self.doc.doc_id.as_str();
        let cached = match self.store.get(doc_id, &page.id).await {
            Ok(record) => record,
            Err(e) => return PageOutcome::Errored(format!("cache lookup failed: {:#}", e)),
        };

        let staleness = classify(page, cached.as_ref(), self.force);
        tracing::debug!(page_id = %page.id, ?staleness, "classified");
        if staleness == Staleness::UpToDate {
            return PageOutcome::SkippedUpToDate;
        }

        let filename = mirror_filename(&page.id, &page.name, parent_name);

        if !self.force {
            let indexed = cached.as_ref().and_then(|r| r.mirror_file.as_deref());
            if let Err(e) = self.mirror.reconcile_rename(&page.id, &filename, indexed) {
                tracing::warn!(page_id = %page.id, error = %e, "rename reconciliation failed");
            }
        }

        let content = match fetch_with_retry(self.source, doc_id, &page.id, self.policy).await {
            Ok(content) => content,
            Err(e) => return PageOutcome::Errored(format!("{:#}", e)),
        };

        let item = PageWrite {
            page,
            parent_name,
            filename: &filename,
            content: &content,
            existed: cached.is_some(),
        };
        match self.writer.write(self.doc, item).await {
            Ok(WriteOutcome::Created(_)) => PageOutcome::Created,
            Ok(WriteOutcome::Updated(_)) => PageOutcome::Updated,
            Ok(WriteOutcome::SkippedEmpty) => PageOutcome::SkippedEmpty,
            Ok(WriteOutcome::SkippedTooShort) => PageOutcome::SkippedTooShort,
            Err(e) => PageOutcome::Errored(format!("{:#}", e)),
        }
    }
}
