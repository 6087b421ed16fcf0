//! Per-document usage counters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Usage bookkeeping for a single document.
///
/// Created lazily the first time a document is retrieved and updated (never
/// reset) on every later retrieval. A low `forgetting_score` hides the
/// document from results but its history is kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DocumentUsage {
    /// Document identifier
    pub doc_id: String,

    /// How many times the document was part of a final result set
    pub access_count: u32,

    /// When the document was last part of a final result set
    pub last_access: Option<DateTime<Utc>>,

    /// Relevance to the most recent query that retrieved it, in [0, 1]
    pub context_relevance: f64,

    /// Last computed retention score, in [0, 1]
    pub forgetting_score: f64,
}

impl Default for DocumentUsage {
    fn default() -> Self {
        Self {
            doc_id: String::new(),
            access_count: 0,
            last_access: None,
            context_relevance: 0.0,
            forgetting_score: 0.0,
        }
    }
}

impl DocumentUsage {
    /// Create an empty usage record for a document
    pub fn new(doc_id: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            ..Default::default()
        }
    }

    /// Record a retrieval of this document with its relevance to the query
    pub fn record_access(&mut self, relevance: f64, at: DateTime<Utc>) {
        self.access_count = self.access_count.saturating_add(1);
        // Out-of-order timestamps never move last_access backwards.
        self.last_access = Some(match self.last_access {
            Some(prev) if prev > at => prev,
            _ => at,
        });
        self.context_relevance = sanitize_unit(relevance);
    }

    /// Store the latest computed retention score
    pub fn set_forgetting_score(&mut self, score: f64) {
        self.forgetting_score = sanitize_unit(score);
    }
}

/// Clamp a value into [0, 1], mapping NaN to 0.
pub(crate) fn sanitize_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
