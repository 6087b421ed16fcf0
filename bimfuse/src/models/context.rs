//! Query context entries kept by the context tracker

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sparse bag-of-words vector: token -> weighted count.
pub type ContextVector = BTreeMap<String, u32>;

/// One past query together with what was retrieved for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryContext {
    /// Unique id of the query
    pub query_id: String,

    /// When the query ran
    pub timestamp: DateTime<Utc>,

    /// Raw query text
    pub query_text: String,

    /// Final retrieved document ids, best first
    pub retrieved_doc_ids: Vec<String>,

    /// Query tokens weighted 2, document tokens weighted 1
    pub context_vector: ContextVector,
}

impl QueryContext {
    /// Weighted count of a token in this context
    pub fn weight_of(&self, token: &str) -> u32 {
        self.context_vector.get(token).copied().unwrap_or(0)
    }
}
