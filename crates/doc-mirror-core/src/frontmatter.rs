//! Frontmatter composition and parsing for mirrored pages.
//!
//! A mirrored file looks like:
//!
//! ```text
//! ---
//! title: Roadmap
//! page_id: canvas-123
//! ...
//! extracted_at: 2024-05-01T12:00:00.000Z
//! ---
//!
//! # Roadmap
//!
//! <raw page content>
//! ```
//!
//! Values are written unquoted on one line. Missing values are written as
//! `null`, booleans as `true`/`false`.

use std::collections::BTreeMap;

use anyhow::{bail, Result};

/// Fields that every mirrored file must carry.
pub const REQUIRED_FIELDS: &[&str] = &["title", "page_id", "doc_id"];

/// Metadata written ahead of a page's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFrontmatter {
    pub title: String,
    pub page_id: String,
    pub doc_id: String,
    pub doc_name: String,
    pub url: String,
    pub content_type: String,
    pub parent_page_id: Option<String>,
    pub parent_page_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub extracted_at: String,
}

impl PageFrontmatter {
    pub fn is_subpage(&self) -> bool {
        self.parent_page_id.is_some()
    }
}

/// Compose the full mirrored document: frontmatter, H1 title, raw content.
pub fn compose_document(meta: &PageFrontmatter, content: &str) -> String {
    let mut out = String::with_capacity(content.len() + 512);
    out.push_str("---\n");
    push_field(&mut out, "title", Some(&meta.title));
    push_field(&mut out, "page_id", Some(&meta.page_id));
    push_field(&mut out, "doc_id", Some(&meta.doc_id));
    push_field(&mut out, "doc_name", Some(&meta.doc_name));
    push_field(&mut out, "url", Some(&meta.url));
    push_field(&mut out, "content_type", Some(&meta.content_type));
    push_field(&mut out, "parent_page_id", meta.parent_page_id.as_deref());
    push_field(&mut out, "parent_page_name", meta.parent_page_name.as_deref());
    push_field(
        &mut out,
        "is_subpage",
        Some(if meta.is_subpage() { "true" } else { "false" }),
    );
    push_field(&mut out, "created_at", Some(&meta.created_at));
    push_field(&mut out, "updated_at", Some(&meta.updated_at));
    push_field(&mut out, "extracted_at", Some(&meta.extracted_at));
    out.push_str("---\n\n");
    out.push_str("# ");
    out.push_str(&single_line(&meta.title));
    out.push_str("\n\n");
    out.push_str(content);
    if !content.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn push_field(out: &mut String, key: &str, value: Option<&str>) {
    out.push_str(key);
    out.push_str(": ");
    match value {
        Some(v) if !v.is_empty() => out.push_str(&single_line(v)),
        _ => out.push_str("null"),
    }
    out.push('\n');
}

fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// Parse the frontmatter block at the top of a mirrored file.
///
/// Returns the `key: value` pairs with `null` values omitted. Fails when
/// the text does not open with a `---` block or a required field is absent.
pub fn parse_frontmatter(text: &str) -> Result<BTreeMap<String, String>> {
    let mut lines = text.lines();
    if lines.next().map(str::trim_end) != Some("---") {
        bail!("missing frontmatter opening delimiter");
    }

    let mut fields = BTreeMap::new();
    let mut closed = false;
    for line in lines {
        let line = line.trim_end();
        if line == "---" {
            closed = true;
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim();
            if value != "null" {
                fields.insert(key.trim().to_string(), value.to_string());
            }
        }
    }
    if !closed {
        bail!("missing frontmatter closing delimiter");
    }
    for field in REQUIRED_FIELDS {
        if !fields.contains_key(*field) {
            bail!("frontmatter is missing required field '{}'", field);
        }
    }
    Ok(fields)
}
