//! Deterministic mirror file naming.
//!
//! `<slug(parent, 30)_>?<slug(name, 60)>-<sanitized id>.md`
//!
//! The page id suffix keeps names unique even when two pages share a title;
//! the slugs keep them readable.

/// Maximum slug length for the page segment.
pub const PAGE_SLUG_MAX: usize = 60;
/// Maximum slug length for the parent segment.
pub const PARENT_SLUG_MAX: usize = 30;

/// Lower-case, keep `[a-z0-9 -]`, collapse space runs to one hyphen and
/// truncate to `max_len` characters.
pub fn slugify(input: &str, max_len: usize) -> String {
    let lower = input.to_lowercase();
    let kept: String = lower
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ' || *c == '-')
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut in_space = false;
    for c in kept.trim().chars() {
        if c == ' ' {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.push(c);
            in_space = false;
        }
    }
    // Slug is pure ASCII here, so byte truncation is char truncation.
    slug.truncate(max_len);
    slug
}

/// Replace every non-alphanumeric character of a page id with a hyphen.
pub fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// File name for a page's markdown mirror.
///
/// `parent_name` is only given for subpages whose parent is known.
pub fn mirror_filename(page_id: &str, page_name: &str, parent_name: Option<&str>) -> String {
    let mut name = String::new();
    if let Some(parent) = parent_name {
        let parent_slug = slugify(parent, PARENT_SLUG_MAX);
        if !parent_slug.is_empty() {
            name.push_str(&parent_slug);
            name.push('_');
        }
    }
    let page_slug = slugify(page_name, PAGE_SLUG_MAX);
    if page_slug.is_empty() {
        name.push_str("untitled");
    } else {
        name.push_str(&page_slug);
    }
    name.push('-');
    name.push_str(&sanitize_id(page_id));
    name.push_str(".md");
    name
}
