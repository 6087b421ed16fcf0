//! Per-document usage bookkeeping.
//!
//! The store keeps one [`DocumentUsage`] record per document that has ever
//! been part of a final result set. Records are created on first access,
//! updated on every later access and never removed by normal operation.

use crate::models::DocumentUsage;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Owned map of usage records keyed by document id.
#[derive(Debug, Clone, Default)]
pub struct UsageStore {
    records: HashMap<String, DocumentUsage>,
}

impl UsageStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from previously exported records
    pub fn from_records(records: impl IntoIterator<Item = DocumentUsage>) -> Self {
        let records = records
            .into_iter()
            .filter(|record| !record.doc_id.is_empty())
            .map(|record| (record.doc_id.clone(), record))
            .collect();
        Self { records }
    }

    /// Look up the usage record of a document
    pub fn get(&self, doc_id: &str) -> Option<&DocumentUsage> {
        self.records.get(doc_id)
    }

    /// Record that a document was retrieved with the given relevance
    pub fn record_access(&mut self, doc_id: &str, relevance: f64, at: DateTime<Utc>) {
        self.records
            .entry(doc_id.to_string())
            .or_insert_with(|| DocumentUsage::new(doc_id))
            .record_access(relevance, at);
    }

    /// Store the last computed retention score of a tracked document.
    ///
    /// Untracked documents are ignored; a record is only created by an access.
    pub fn set_forgetting_score(&mut self, doc_id: &str, score: f64) -> bool {
        match self.records.get_mut(doc_id) {
            Some(record) => {
                record.set_forgetting_score(score);
                true
            }
            None => false,
        }
    }

    /// Number of tracked documents
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no document has been tracked yet
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over all usage records
    pub fn iter(&self) -> impl Iterator<Item = &DocumentUsage> {
        self.records.values()
    }

    /// Export all records sorted by document id
    pub fn records(&self) -> Vec<DocumentUsage> {
        let mut records: Vec<_> = self.records.values().cloned().collect();
        records.sort_by(|a, b| a.doc_id.cmp(&b.doc_id));
        records
    }

    /// Sum of access counts over all documents
    pub fn total_accesses(&self) -> u64 {
        self.records.values().map(|r| r.access_count as u64).sum()
    }

    /// Drop every record
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_records_are_created_lazily() {
        let mut store = UsageStore::new();
        assert!(store.get("wall-1").is_none());
        assert!(!store.set_forgetting_score("wall-1", 0.5));
        assert!(store.is_empty());

        store.record_access("wall-1", 0.4, Utc::now());
        let record = store.get("wall-1").unwrap();
        assert_eq!(record.access_count, 1);
        assert_eq!(record.context_relevance, 0.4);
    }

    #[test]
    fn test_records_are_updated_not_reset() {
        let mut store = UsageStore::new();
        let now = Utc::now();
        store.record_access("issue-7", 0.9, now - Duration::days(2));
        store.record_access("issue-7", 0.1, now);
        assert!(store.set_forgetting_score("issue-7", 0.42));

        let record = store.get("issue-7").unwrap();
        assert_eq!(record.access_count, 2);
        assert_eq!(record.last_access, Some(now));
        assert_eq!(record.context_relevance, 0.1);
        assert_eq!(record.forgetting_score, 0.42);
        assert_eq!(store.total_accesses(), 2);
    }

    #[test]
    fn test_round_trip_through_records() {
        let mut store = UsageStore::new();
        let now = Utc::now();
        store.record_access("b", 0.2, now);
        store.record_access("a", 0.3, now);

        let records = store.records();
        assert_eq!(records[0].doc_id, "a");
        assert_eq!(records[1].doc_id, "b");

        let restored = UsageStore::from_records(records);
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.get("a"), store.get("a"));
    }

    #[test]
    fn test_records_without_id_are_dropped_on_import() {
        let restored = UsageStore::from_records(vec![DocumentUsage::default()]);
        assert!(restored.is_empty());
    }
}
