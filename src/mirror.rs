//! The flat-file markdown mirror.
//!
//! One `.md` file per page, named by
//! [`mirror_filename`](doc_mirror_core::naming::mirror_filename). At most one
//! live file may reference a given `page_id`; the filesystem does not enforce
//! that, so [`MirrorDir::reconcile_rename`] removes the previous file of a
//! page before a file under a new name is written.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use doc_mirror_core::frontmatter::parse_frontmatter;

/// Handle to an existing mirror directory.
#[derive(Debug, Clone)]
pub struct MirrorDir {
    root: PathBuf,
}

impl MirrorDir {
    /// Create the directory (and parents) if needed.
    ///
    /// Failure here is fatal to a sync run.
    pub fn create(root: &Path) -> Result<Self> {
        fs::create_dir_all(root).with_context(|| {
            format!("Failed to create mirror directory: {}", root.display())
        })?;
        if !root.is_dir() {
            anyhow::bail!("Mirror path is not a directory: {}", root.display());
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Remove the file that held `page_id` under a previous name.
    ///
    /// `indexed` is the file name recorded in the page cache for this page.
    /// When it names another file that still exists, that file is removed
    /// without scanning. Otherwise (no index, index equal to `target`, or
    /// indexed file gone) every `.md` file except `target` is scanned for
    /// frontmatter `page_id: <page_id>` and the first match is removed.
    /// Unreadable or malformed files are skipped with a warning.
    ///
    /// Returns the removed path, if any.
    pub fn reconcile_rename(
        &self,
        page_id: &str,
        target: &str,
        indexed: Option<&str>,
    ) -> Result<Option<PathBuf>> {
        if let Some(previous) = indexed.filter(|f| is_plain_filename(f) && *f != target) {
            let path = self.path_for(previous);
            if path.is_file() {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
                tracing::info!(page_id, removed = %path.display(), "removed renamed mirror file");
                return Ok(Some(path));
            }
        }

        match self.find_by_page_id(page_id, target)? {
            Some(path) => {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
                tracing::info!(page_id, removed = %path.display(), "removed stale mirror file");
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }

    /// Linear scan for the first `.md` file (other than `exclude`) whose
    /// frontmatter names `page_id`.
    pub fn find_by_page_id(&self, page_id: &str, exclude: &str) -> Result<Option<PathBuf>> {
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read mirror directory: {}", self.root.display()))?;

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable mirror entry");
                    continue;
                }
            };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            if entry.file_name().to_str() == Some(exclude) {
                continue;
            }

            let text = match fs::read_to_string(&path) {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "skipping unreadable mirror file");
                    continue;
                }
            };
            match parse_frontmatter(&text) {
                Ok(fields) => {
                    if fields.get("page_id").map(String::as_str) == Some(page_id) {
                        return Ok(Some(path));
                    }
                }
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "skipping malformed mirror file");
                }
            }
        }

        Ok(None)
    }

    /// Write `content` to `filename`, replacing any existing file.
    ///
    /// The text goes to a temporary file in the mirror directory first and
    /// is renamed into place, so readers never see a partial page.
    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf> {
        let target = self.path_for(filename);
        let mut tmp = NamedTempFile::new_in(&self.root)
            .with_context(|| format!("Failed to create temp file in {}", self.root.display()))?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&target)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        Ok(target)
    }
}

fn is_plain_filename(name: &str) -> bool {
    !name.is_empty() && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_mirror_core::frontmatter::{compose_document, PageFrontmatter};
    use tempfile::TempDir;

    fn page_doc(page_id: &str, title: &str) -> String {
        let meta = PageFrontmatter {
            title: title.to_string(),
            page_id: page_id.to_string(),
            doc_id: "doc-1".to_string(),
            doc_name: "Handbook".to_string(),
            url: String::new(),
            content_type: "canvas".to_string(),
            parent_page_id: None,
            parent_page_name: None,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
            extracted_at: "2024-01-01T00:00:00Z".to_string(),
        };
        compose_document(&meta, "Some page body.")
    }

    #[test]
    fn create_makes_nested_directories() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("a/b/mirror");
        let mirror = MirrorDir::create(&root).unwrap();
        assert!(mirror.root().is_dir());
    }

    #[test]
    fn create_fails_when_path_is_a_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("occupied");
        fs::write(&file, "x").unwrap();
        assert!(MirrorDir::create(&file).is_err());
    }

    #[test]
    fn write_overwrites_in_place() {
        let tmp = TempDir::new().unwrap();
        let mirror = MirrorDir::create(tmp.path()).unwrap();
        mirror.write("page-p1.md", "one").unwrap();
        let path = mirror.write("page-p1.md", "two").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "two");
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn scan_removes_old_name_only() {
        let tmp = TempDir::new().unwrap();
        let mirror = MirrorDir::create(tmp.path()).unwrap();
        mirror.write("old-name-p1.md", &page_doc("p1", "Old Name")).unwrap();
        mirror.write("other-p10.md", &page_doc("p10", "Other")).unwrap();

        let removed = mirror
            .reconcile_rename("p1", "new-name-p1.md", None)
            .unwrap();

        assert_eq!(removed, Some(tmp.path().join("old-name-p1.md")));
        assert!(!tmp.path().join("old-name-p1.md").exists());
        assert!(tmp.path().join("other-p10.md").exists());
    }

    #[test]
    fn scan_skips_target_and_malformed_files() {
        let tmp = TempDir::new().unwrap();
        let mirror = MirrorDir::create(tmp.path()).unwrap();
        mirror.write("same-p1.md", &page_doc("p1", "Same")).unwrap();
        mirror.write("notes.md", "page_id: p1 but no frontmatter").unwrap();
        fs::write(tmp.path().join("copy-p1.txt"), page_doc("p1", "Copy")).unwrap();

        let removed = mirror.reconcile_rename("p1", "same-p1.md", None).unwrap();

        assert_eq!(removed, None);
        assert!(tmp.path().join("same-p1.md").exists());
        assert!(tmp.path().join("notes.md").exists());
        assert!(tmp.path().join("copy-p1.txt").exists());
    }

    #[test]
    fn indexed_file_is_removed_without_scan() {
        let tmp = TempDir::new().unwrap();
        let mirror = MirrorDir::create(tmp.path()).unwrap();
        // Content does not matter on the indexed path.
        mirror.write("renamed-p1.md", "legacy body").unwrap();

        let removed = mirror
            .reconcile_rename("p1", "current-p1.md", Some("renamed-p1.md"))
            .unwrap();

        assert_eq!(removed, Some(tmp.path().join("renamed-p1.md")));
    }

    #[test]
    fn index_equal_to_target_still_scans() {
        let tmp = TempDir::new().unwrap();
        let mirror = MirrorDir::create(tmp.path()).unwrap();
        mirror.write("current-p1.md", &page_doc("p1", "Current")).unwrap();
        mirror.write("stray-p1.md", &page_doc("p1", "Stray")).unwrap();

        let removed = mirror
            .reconcile_rename("p1", "current-p1.md", Some("current-p1.md"))
            .unwrap();

        assert_eq!(removed, Some(tmp.path().join("stray-p1.md")));
        assert!(tmp.path().join("current-p1.md").exists());
    }

    #[test]
    fn index_outside_mirror_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let mirror = MirrorDir::create(&tmp.path().join("m")).unwrap();
        fs::write(tmp.path().join("outside.md"), "keep").unwrap();

        let removed = mirror
            .reconcile_rename("p1", "current-p1.md", Some("../outside.md"))
            .unwrap();

        assert_eq!(removed, None);
        assert!(tmp.path().join("outside.md").exists());
    }
}
