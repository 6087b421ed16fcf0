//! Bounded history of recent queries and what they retrieved.

use crate::config::ConfigError;
use crate::models::{ContextVector, Document, QueryContext};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use super::tokenizer::{token_set, tokenize};

/// Weight of a query token in the context vector
pub const QUERY_TOKEN_WEIGHT: u32 = 2;

/// Weight of a retrieved-document token in the context vector
pub const DOCUMENT_TOKEN_WEIGHT: u32 = 1;

/// Relevance signal produced for each retrieved document by [`ContextTracker::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextUpdate {
    /// `(doc_id, relevance)` in retrieval order
    pub relevances: Vec<(String, f64)>,
}

impl ContextUpdate {
    /// Whether the update recorded nothing
    pub fn is_empty(&self) -> bool {
        self.relevances.is_empty()
    }
}

/// FIFO ring buffer of [`QueryContext`] entries with a fixed capacity.
#[derive(Debug, Clone)]
pub struct ContextTracker {
    window_size: usize,
    history: VecDeque<QueryContext>,
}

impl ContextTracker {
    /// Create a tracker holding at most `window_size` queries
    pub fn try_new(window_size: usize) -> Result<Self, ConfigError> {
        if window_size == 0 {
            return Err(ConfigError::ValidationError(
                "context window size must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            window_size,
            history: VecDeque::with_capacity(window_size),
        })
    }

    /// Maximum number of queries kept
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Record a query and its final retrieved documents.
    ///
    /// `documents` supplies the text of retrieved ids that could be resolved;
    /// unresolved ids still count as retrieved, with relevance 0. An empty
    /// query with nothing retrieved is a no-op.
    pub fn update(
        &mut self,
        query_text: &str,
        retrieved_doc_ids: &[String],
        documents: &[Document],
        now: DateTime<Utc>,
    ) -> ContextUpdate {
        if query_text.trim().is_empty() && retrieved_doc_ids.is_empty() {
            return ContextUpdate::default();
        }

        let mut context_vector = ContextVector::new();
        for token in tokenize(query_text) {
            *context_vector.entry(token).or_insert(0) += QUERY_TOKEN_WEIGHT;
        }
        for document in documents {
            for token in tokenize(&document.text()) {
                *context_vector.entry(token).or_insert(0) += DOCUMENT_TOKEN_WEIGHT;
            }
        }

        let context = QueryContext {
            query_id: uuid::Uuid::new_v4().to_string(),
            timestamp: now,
            query_text: query_text.to_string(),
            retrieved_doc_ids: retrieved_doc_ids.to_vec(),
            context_vector,
        };

        let relevances = retrieved_doc_ids
            .iter()
            .map(|doc_id| {
                let relevance = documents
                    .iter()
                    .find(|doc| &doc.doc_id == doc_id)
                    .map(|doc| Self::relevance(doc, &context))
                    .unwrap_or(0.0);
                (doc_id.clone(), relevance)
            })
            .collect();

        self.push(context);
        ContextUpdate { relevances }
    }

    /// Share of the query's distinct tokens that also occur in the document.
    ///
    /// Returns 0 when the query has no tokens.
    pub fn relevance(document: &Document, context: &QueryContext) -> f64 {
        let query_tokens = token_set(&context.query_text);
        if query_tokens.is_empty() {
            return 0.0;
        }
        let doc_tokens = token_set(&document.text());
        let shared = query_tokens.intersection(&doc_tokens).count();
        shared as f64 / query_tokens.len() as f64
    }

    /// Relevance of a document against the newest query, 0 with no history
    pub fn relevance_to_latest(&self, document: &Document) -> f64 {
        self.latest()
            .map(|context| Self::relevance(document, context))
            .unwrap_or(0.0)
    }

    /// Newest context entry
    pub fn latest(&self) -> Option<&QueryContext> {
        self.history.back()
    }

    /// Context entries, oldest first
    pub fn history(&self) -> impl Iterator<Item = &QueryContext> {
        self.history.iter()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether no query has been recorded
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Replace the history, keeping only the newest `window_size` entries
    pub fn restore(&mut self, entries: Vec<QueryContext>) {
        self.history.clear();
        for entry in entries {
            self.push(entry);
        }
    }

    /// Drop all history
    pub fn clear(&mut self) {
        self.history.clear();
    }

    fn push(&mut self, context: QueryContext) {
        while self.history.len() >= self.window_size {
            self.history.pop_front();
        }
        self.history.push_back(context);
    }
}

impl Default for ContextTracker {
    fn default() -> Self {
        Self {
            window_size: 10,
            history: VecDeque::with_capacity(10),
        }
    }
}
