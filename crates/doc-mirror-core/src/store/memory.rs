//! In-memory [`PageStore`] implementation for tests and dry runs.
//!
//! Uses a `HashMap` behind `std::sync::RwLock`.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::CachedPageRecord;

use super::PageStore;

/// In-memory page cache keyed by `(doc_id, page_id)`.
pub struct InMemoryStore {
    records: RwLock<HashMap<(String, String), CachedPageRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Number of records across all documents.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageStore for InMemoryStore {
    async fn get(&self, doc_id: &str, page_id: &str) -> Result<Option<CachedPageRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("page store lock poisoned"))?;
        Ok(records
            .get(&(doc_id.to_string(), page_id.to_string()))
            .cloned())
    }

    async fn upsert(&self, record: &CachedPageRecord) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| anyhow!("page store lock poisoned"))?;
        records.insert(
            (record.doc_id.clone(), record.page_id.clone()),
            record.clone(),
        );
        Ok(())
    }

    async fn list_recent(&self, doc_id: &str, limit: i64) -> Result<Vec<CachedPageRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("page store lock poisoned"))?;
        let mut matching: Vec<CachedPageRecord> = records
            .values()
            .filter(|r| r.doc_id == doc_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.extracted_at.cmp(&a.extracted_at));
        matching.truncate(limit.max(0) as usize);
        Ok(matching)
    }

    async fn count(&self, doc_id: &str) -> Result<i64> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("page store lock poisoned"))?;
        Ok(records.values().filter(|r| r.doc_id == doc_id).count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(doc: &str, page: &str, content: &str, extracted_at: i64) -> CachedPageRecord {
        CachedPageRecord {
            doc_id: doc.to_string(),
            page_id: page.to_string(),
            doc_name: "Doc".to_string(),
            page_name: page.to_uppercase(),
            url: String::new(),
            content: content.to_string(),
            content_type: "canvas".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
            extracted_at,
            mirror_file: None,
        }
    }

    #[tokio::test]
    async fn upsert_overwrites_same_key() {
        let store = InMemoryStore::new();
        store.upsert(&record("d", "p", "first", 1)).await.unwrap();
        store.upsert(&record("d", "p", "second", 2)).await.unwrap();

        assert_eq!(store.len(), 1);
        let got = store.get("d", "p").await.unwrap().unwrap();
        assert_eq!(got.content, "second");
        assert_eq!(got.extracted_at, 2);
    }

    #[tokio::test]
    async fn list_recent_is_scoped_and_ordered() {
        let store = InMemoryStore::new();
        store.upsert(&record("d", "a", "x", 10)).await.unwrap();
        store.upsert(&record("d", "b", "x", 30)).await.unwrap();
        store.upsert(&record("d", "c", "x", 20)).await.unwrap();
        store.upsert(&record("other", "z", "x", 99)).await.unwrap();

        let recent = store.list_recent("d", 2).await.unwrap();
        let ids: Vec<&str> = recent.iter().map(|r| r.page_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(store.count("d").await.unwrap(), 3);
        assert!(store.get("d", "z").await.unwrap().is_none());
    }
}
