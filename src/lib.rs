//! # doc-mirror
//!
//! Incremental mirroring of a remote hierarchical document into a directory
//! of markdown files and a SQLite page cache.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌───────────────────────────┐
//! │ PageSource  │──▶│ Filter +     │──▶│ Fetch (retry) ─▶ Mirror   │
//! │ (HTTP API)  │   │ Staleness    │   │   .md file ─▶ SQLite cache │
//! └─────────────┘   └──────────────┘   └───────────────────────────┘
//!                         ▲                          │
//!                         └──── pages (cache) ◀──────┘
//! ```
//!
//! ## Data Flow
//!
//! 1. The [`traits::PageSource`] lists every page of a document.
//! 2. The hierarchy filter drops subpages (optional) and hidden pages.
//! 3. Each remaining page is compared against its cache record; fresh
//!    pages are skipped without a network call.
//! 4. A page under a new name has its previous mirror file removed
//!    ([`mirror`]).
//! 5. Content is fetched with bounded retries ([`fetch`]), written to the
//!    mirror and then upserted into the cache ([`writer`]).
//! 6. A fixed pause separates consecutive pages ([`pacer`]).
//!
//! ## Quick Start
//!
//! ```bash
//! docmirror init                    # create database
//! docmirror sync <doc-id>           # mirror changed pages
//! docmirror sync <doc-id> --force   # re-extract everything
//! docmirror status <doc-id>         # what is cached
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Schema creation (idempotent) |
//! | [`sqlite_store`] | SQLite `PageStore` |
//! | [`traits`] | The `PageSource` seam |
//! | [`source_http`] | HTTP `PageSource` for the remote document API |
//! | [`fetch`] | Content fetch with fixed-delay retries |
//! | [`pacer`] | Fixed pause between pages |
//! | [`mirror`] | Mirror directory: rename reconciliation and atomic writes |
//! | [`writer`] | Mirror file then cache record, per page |
//! | [`ingest`] | The sync pipeline driver |
//! | [`progress`] | Per-page progress on stderr |
//! | [`get`] | Cached page retrieval |
//! | [`stats`] | Cache status per document |

pub mod config;
pub mod db;
pub mod fetch;
pub mod get;
pub mod ingest;
pub mod migrate;
pub mod mirror;
pub mod pacer;
pub mod progress;
pub mod source_http;
pub mod sqlite_store;
pub mod stats;
pub mod traits;
pub mod writer;

pub use doc_mirror_core::models::{CachedPageRecord, Page};
pub use doc_mirror_core::store;
pub use ingest::{run_sync, run_sync_with_source, PageOutcome, SyncOptions, SyncReport};
pub use traits::PageSource;
