//! Hierarchy filter: reduce a document's page list to the pages eligible
//! for extraction.
//!
//! Two rules apply, in order:
//!
//! 1. `exclude_subpages` drops every page that has a parent.
//! 2. Unless `include_hidden` is set, pages whose lower-cased name contains
//!    one of [`HIDDEN_MARKERS`], or starts with `_` or `.`, are dropped.
//!
//! The returned [`FilterStats`] count what each rule removed. They are for
//! audit output only.

use std::fmt;

use crate::models::Page;

/// Substrings that mark a page as not meant for mirroring.
pub const HIDDEN_MARKERS: &[&str] = &["hidden", "private", "draft", "temp", "test"];

/// Per-rule removal counts from [`filter_pages`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub total: usize,
    pub subpages_removed: usize,
    pub hidden_removed: usize,
    pub remaining: usize,
}

impl FilterStats {
    pub fn removed(&self) -> usize {
        self.subpages_removed + self.hidden_removed
    }
}

impl fmt::Display for FilterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pages, {} subpages excluded, {} hidden excluded, {} remaining",
            self.total, self.subpages_removed, self.hidden_removed, self.remaining
        )
    }
}

/// Whether a page name looks hidden, private or scratch.
pub fn is_hidden_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.starts_with('_')
        || lower.starts_with('.')
        || HIDDEN_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Apply the hierarchy and naming rules, preserving list order.
pub fn filter_pages(
    pages: Vec<Page>,
    exclude_subpages: bool,
    include_hidden: bool,
) -> (Vec<Page>, FilterStats) {
    let mut stats = FilterStats {
        total: pages.len(),
        ..Default::default()
    };

    let mut kept = pages;

    if exclude_subpages {
        let before = kept.len();
        kept.retain(|page| !page.is_subpage());
        stats.subpages_removed = before - kept.len();
    }

    if !include_hidden {
        let before = kept.len();
        kept.retain(|page| !is_hidden_name(&page.name));
        stats.hidden_removed = before - kept.len();
    }

    stats.remaining = kept.len();
    (kept, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(id: &str, name: &str, parent: Option<&str>) -> Page {
        Page {
            id: id.to_string(),
            name: name.to_string(),
            parent_id: parent.map(str::to_string),
            content_type: "canvas".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
            browser_link: String::new(),
        }
    }

    #[test]
    fn hidden_name_rules() {
        assert!(is_hidden_name("_scratch"));
        assert!(is_hidden_name(".config"));
        assert!(is_hidden_name("My DRAFT notes"));
        assert!(is_hidden_name("Templates"));
        assert!(is_hidden_name("Contest results"));
        assert!(!is_hidden_name("Roadmap"));
        assert!(!is_hidden_name("Q3 planning_notes"));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let (kept, stats) = filter_pages(Vec::new(), true, false);
        assert!(kept.is_empty());
        assert_eq!(stats, FilterStats::default());
    }

    #[test]
    fn subpage_rule_runs_before_hidden_rule() {
        let pages = vec![
            page("a", "Overview", None),
            page("b", "_Archive", None),
            page("c", "_Child scratch", Some("a")),
            page("d", "Child", Some("a")),
        ];
        let (kept, stats) = filter_pages(pages, true, false);
        let ids: Vec<&str> = kept.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
        assert_eq!(stats.subpages_removed, 2);
        assert_eq!(stats.hidden_removed, 1);
        assert_eq!(stats.remaining, 1);
        assert_eq!(stats.removed(), 3);
    }

    #[test]
    fn flags_disable_rules() {
        let pages = vec![page("a", "_Archive", None), page("b", "Child", Some("a"))];
        let (kept, stats) = filter_pages(pages, false, true);
        assert_eq!(kept.len(), 2);
        assert_eq!(stats.removed(), 0);
    }

    #[test]
    fn literal_ten_page_scenario() {
        // 10 pages: 3 subpages, 2 underscore-named top-level pages.
        let mut pages = Vec::new();
        for i in 0..5 {
            pages.push(page(&format!("top-{}", i), &format!("Page {}", i), None));
        }
        pages.push(page("u1", "_Inbox", None));
        pages.push(page("u2", "_Old", None));
        for i in 0..3 {
            pages.push(page(&format!("sub-{}", i), &format!("Sub {}", i), Some("top-0")));
        }
        assert_eq!(pages.len(), 10);

        let (kept, stats) = filter_pages(pages, true, false);
        assert_eq!(kept.len(), 10 - 3 - 2);
        assert_eq!(stats.to_string(), "10 pages, 3 subpages excluded, 2 hidden excluded, 5 remaining");
    }
}
