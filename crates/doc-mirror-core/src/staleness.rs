//! Staleness classification: decide whether a page needs (re)extraction.
//!
//! The check is one-sided. A page is fresh when its remote `updatedAt` is
//! at or before the local `extracted_at` of its cache record. Remote
//! deletions are not detected.

use crate::models::{CachedPageRecord, Page};

/// Result of comparing a page against its cache record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    /// `force` was requested.
    Forced,
    /// No cache record exists yet.
    New,
    /// The remote page changed after the last extraction.
    Stale,
    /// The cache record is at least as recent as the remote page.
    UpToDate,
}

impl Staleness {
    pub fn needs_extraction(self) -> bool {
        !matches!(self, Staleness::UpToDate)
    }
}

/// Classify a page against its cache record.
///
/// An `updatedAt` that cannot be parsed classifies the page as stale.
pub fn classify(page: &Page, cached: Option<&CachedPageRecord>, force: bool) -> Staleness {
    if force {
        return Staleness::Forced;
    }
    let Some(record) = cached else {
        return Staleness::New;
    };
    match page.updated_at_ms() {
        Some(updated) if updated <= record.extracted_at => Staleness::UpToDate,
        _ => Staleness::Stale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(updated_at: &str) -> Page {
        Page {
            id: "p1".to_string(),
            name: "Roadmap".to_string(),
            parent_id: None,
            content_type: "canvas".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: updated_at.to_string(),
            browser_link: String::new(),
        }
    }

    fn record(extracted_at: i64) -> CachedPageRecord {
        CachedPageRecord {
            doc_id: "d1".to_string(),
            page_id: "p1".to_string(),
            doc_name: "Doc".to_string(),
            page_name: "Roadmap".to_string(),
            url: String::new(),
            content: "content body".to_string(),
            content_type: "canvas".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
            extracted_at,
            mirror_file: None,
        }
    }

    const T: i64 = 1_704_067_200_000; // 2024-01-01T00:00:00Z

    #[test]
    fn force_always_extracts() {
        let r = record(T + 10_000);
        assert_eq!(classify(&page("2024-01-01T00:00:00Z"), Some(&r), true), Staleness::Forced);
        assert!(Staleness::Forced.needs_extraction());
    }

    #[test]
    fn missing_record_is_new() {
        assert_eq!(classify(&page("2024-01-01T00:00:00Z"), None, false), Staleness::New);
    }

    #[test]
    fn boundary_is_up_to_date() {
        let p = page("2024-01-01T00:00:00Z");
        assert_eq!(classify(&p, Some(&record(T)), false), Staleness::UpToDate);
        assert_eq!(classify(&p, Some(&record(T + 1)), false), Staleness::UpToDate);
        assert_eq!(classify(&p, Some(&record(T - 1)), false), Staleness::Stale);
        assert!(!Staleness::UpToDate.needs_extraction());
    }

    #[test]
    fn unparseable_update_time_is_stale() {
        assert_eq!(classify(&page("n/a"), Some(&record(T)), false), Staleness::Stale);
    }
}
