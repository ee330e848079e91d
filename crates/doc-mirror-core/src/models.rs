//! Core data models for the document mirror.
//!
//! [`Page`] values come from the remote page source and are rebuilt on
//! every run. [`CachedPageRecord`] is the durable per-page row kept by a
//! [`PageStore`](crate::store::PageStore), keyed by `(doc_id, page_id)`.

use serde::{Deserialize, Serialize};

/// A page of a remote document, as listed by the page source.
///
/// Timestamps are kept as the ISO-8601 strings the remote system returned;
/// [`Page::updated_at_ms`] parses them when a comparison is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub content_type: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub browser_link: String,
}

impl Page {
    /// Whether this page hangs under another page of the same document.
    pub fn is_subpage(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Remote update time in milliseconds since the Unix epoch.
    ///
    /// Returns `None` when the remote timestamp is not valid RFC 3339.
    pub fn updated_at_ms(&self) -> Option<i64> {
        parse_timestamp_ms(&self.updated_at)
    }
}

/// Parse an RFC 3339 timestamp into epoch milliseconds.
pub fn parse_timestamp_ms(value: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.timestamp_millis())
}

/// The last successful extraction of one page.
///
/// Exactly one record exists per `(doc_id, page_id)`; a new extraction
/// replaces the previous one wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedPageRecord {
    pub doc_id: String,
    pub page_id: String,
    pub doc_name: String,
    pub page_name: String,
    pub url: String,
    pub content: String,
    pub content_type: String,
    /// Remote creation time captured at extraction.
    pub created_at: String,
    /// Remote update time captured at extraction.
    pub updated_at: String,
    /// Local wall-clock time of the write, epoch milliseconds.
    pub extracted_at: i64,
    /// File name (relative to the mirror directory) last written for this page.
    pub mirror_file: Option<String>,
}

impl CachedPageRecord {
    /// Primary key used by relational stores: `"{doc_id}-{page_id}"`.
    pub fn key(&self) -> String {
        record_key(&self.doc_id, &self.page_id)
    }

    /// Length of the stored content in characters.
    pub fn content_length(&self) -> i64 {
        self.content.chars().count() as i64
    }
}

/// Build the composite primary key for a page record.
pub fn record_key(doc_id: &str, page_id: &str) -> String {
    format!("{}-{}", doc_id, page_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_remote_timestamps() {
        assert_eq!(parse_timestamp_ms("1970-01-01T00:00:01.500Z"), Some(1500));
        assert_eq!(
            parse_timestamp_ms("2024-03-01T10:00:00+01:00"),
            parse_timestamp_ms("2024-03-01T09:00:00Z")
        );
        assert_eq!(parse_timestamp_ms("yesterday"), None);
    }

    #[test]
    fn page_deserializes_from_camel_case() {
        let page: Page = serde_json::from_str(
            r#"{"id":"canvas-1","name":"Roadmap","parentId":"canvas-0","contentType":"canvas",
                "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-02T00:00:00Z",
                "browserLink":"https://example.com/d/_dx#Roadmap"}"#,
        )
        .unwrap();
        assert!(page.is_subpage());
        assert_eq!(page.content_type, "canvas");
        assert_eq!(page.updated_at_ms(), Some(1_704_153_600_000));
    }

    #[test]
    fn record_key_joins_with_hyphen() {
        assert_eq!(record_key("doc1", "canvas-2"), "doc1-canvas-2");
    }
}
