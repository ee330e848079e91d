//! # doc-mirror core
//!
//! Runtime-free logic for the incremental document mirror: the page and
//! cache record models, the hierarchy filter, the staleness classifier,
//! deterministic mirror file naming, frontmatter composition and parsing,
//! and the [`store::PageStore`] abstraction with an in-memory backend.
//!
//! This crate contains no tokio, sqlx or filesystem I/O.

pub mod filter;
pub mod frontmatter;
pub mod models;
pub mod naming;
pub mod staleness;
pub mod store;
