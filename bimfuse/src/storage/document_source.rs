//! Read-only access to the documents behind retrieved ids.
//!
//! Documents live in the external graph or index. The engine only needs
//! their text to update the query context, so the contract is a lookup by id.

use crate::models::Document;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Resolves document ids to documents
#[async_trait]
pub trait DocumentSource: Send + Sync + std::fmt::Debug {
    /// Look up a single document; unknown ids resolve to `None`
    async fn get_document(&self, doc_id: &str) -> Option<Document>;

    /// Look up several documents, skipping unknown ids and keeping input order
    async fn get_documents(&self, doc_ids: &[String]) -> Vec<Document> {
        let mut documents = Vec::with_capacity(doc_ids.len());
        for doc_id in doc_ids {
            if let Some(document) = self.get_document(doc_id).await {
                documents.push(document);
            }
        }
        documents
    }
}

/// Document source backed by a map in memory
#[derive(Debug, Default)]
pub struct InMemoryDocumentSource {
    documents: RwLock<HashMap<String, Document>>,
}

impl InMemoryDocumentSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source holding the given documents
    pub fn with_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let documents = documents
            .into_iter()
            .map(|document| (document.doc_id.clone(), document))
            .collect();
        Self {
            documents: RwLock::new(documents),
        }
    }

    /// Add or replace a document
    pub async fn insert(&self, document: Document) {
        self.documents
            .write()
            .await
            .insert(document.doc_id.clone(), document);
    }

    /// Remove a document, returning it if present
    pub async fn remove(&self, doc_id: &str) -> Option<Document> {
        self.documents.write().await.remove(doc_id)
    }

    /// Number of documents held
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether the source is empty
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentSource for InMemoryDocumentSource {
    async fn get_document(&self, doc_id: &str) -> Option<Document> {
        self.documents.read().await.get(doc_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentKind;

    #[tokio::test]
    async fn test_lookup_skips_unknown_ids() {
        let source = InMemoryDocumentSource::with_documents([
            Document::new("w1", DocumentKind::Entity, "Wall W-01"),
            Document::new("i7", DocumentKind::Issue, "Fire rating missing"),
        ]);

        let ids = vec!["i7".to_string(), "ghost".to_string(), "w1".to_string()];
        let found = source.get_documents(&ids).await;
        let found: Vec<_> = found.iter().map(|d| d.doc_id.as_str()).collect();
        assert_eq!(found, vec!["i7", "w1"]);
        assert!(source.get_document("ghost").await.is_none());
    }

    #[tokio::test]
    async fn test_insert_and_remove() {
        let source = InMemoryDocumentSource::new();
        assert!(source.is_empty().await);

        source
            .insert(Document::new("d1", DocumentKind::Issue, "Clash"))
            .await;
        assert_eq!(source.len().await, 1);
        assert!(source.remove("d1").await.is_some());
        assert!(source.is_empty().await);
    }
}
