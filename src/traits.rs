//! The remote page source seam.
//!
//! The mirror pipeline never talks HTTP directly. It drives a
//! [`PageSource`], which lists a document's pages and exports one page's
//! text at a time. [`HttpPageSource`](crate::source_http::HttpPageSource)
//! is the built-in implementation; tests plug in in-memory sources.
//!
//! # Example
//!
//! ```rust
//! use anyhow::Result;
//! use async_trait::async_trait;
//! use doc_mirror::traits::PageSource;
//! use doc_mirror_core::models::Page;
//!
//! pub struct StaticSource {
//!     pages: Vec<Page>,
//! }
//!
//! #[async_trait]
//! impl PageSource for StaticSource {
//!     async fn document_name(&self, doc_id: &str) -> Result<String> {
//!         Ok(doc_id.to_string())
//!     }
//!
//!     async fn list_pages(&self, _doc_id: &str) -> Result<Vec<Page>> {
//!         Ok(self.pages.clone())
//!     }
//!
//!     async fn fetch_content(&self, _doc_id: &str, _page_id: &str) -> Result<String> {
//!         Ok(String::new())
//!     }
//! }
//! ```

use anyhow::Result;
use async_trait::async_trait;

use doc_mirror_core::models::Page;

/// A remote hierarchical document service.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Display name of the document, written into every mirrored file.
    async fn document_name(&self, doc_id: &str) -> Result<String>;

    /// Every page of the document, in the source's order.
    ///
    /// A failure here is fatal to the run.
    async fn list_pages(&self, doc_id: &str) -> Result<Vec<Page>>;

    /// Full textual content of one page.
    ///
    /// May fail transiently; callers retry. May legitimately return an
    /// empty string for pages whose content lives in their children.
    async fn fetch_content(&self, doc_id: &str, page_id: &str) -> Result<String>;
}
