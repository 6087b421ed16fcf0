//! Result envelopes shared by backends and the fusion engine

use serde::{Deserialize, Serialize};

/// Open map for backend-specific or strategy-specific extras.
///
/// The core never reads fields out of it; it only writes explanatory data.
pub type Details = serde_json::Map<String, serde_json::Value>;

/// The uniform envelope every retrieval backend returns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct BackendResponse {
    /// Human readable answer
    pub answer: String,

    /// Backend confidence in [0, 1]
    pub confidence: f64,

    /// Number of results the backend found (may exceed `entities.len()`)
    pub result_count: usize,

    /// Retrieved document ids, best first
    pub entities: Vec<String>,

    /// Name of the producing backend
    pub source: String,

    /// Backend-specific extras
    pub details: Details,
}

impl BackendResponse {
    /// Create a response with an answer and confidence
    pub fn new(source: impl Into<String>, answer: impl Into<String>, confidence: f64) -> Self {
        Self {
            answer: answer.into(),
            confidence,
            source: source.into(),
            ..Default::default()
        }
    }

    /// Attach retrieved document ids; `result_count` follows the list length
    pub fn with_entities<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities = entities.into_iter().map(Into::into).collect();
        self.result_count = self.entities.len();
        self
    }

    /// Override the reported result count
    pub fn with_result_count(mut self, result_count: usize) -> Self {
        self.result_count = result_count;
        self
    }

    /// Zero-confidence sentinel used whenever a backend produced nothing usable
    pub fn empty(source: impl Into<String>, answer: impl Into<String>) -> Self {
        Self::new(source, answer, 0.0)
    }
}

/// How a retention score was assembled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ScoreBreakdown {
    /// Recency factor in [0, 1]
    pub recency: f64,
    /// Usage factor in [0, 1]
    pub usage: f64,
    /// Context relevance factor in [0, 1]
    pub relevance: f64,
    /// Weight applied to recency
    pub recency_weight: f64,
    /// Weight applied to usage
    pub usage_weight: f64,
    /// Weight applied to relevance
    pub relevance_weight: f64,
    /// Final weighted score in [0, 1]
    pub forgetting_score: f64,
}

/// A single ranked document produced for one query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalResult {
    /// Document identifier
    pub doc_id: String,

    /// Score derived from backend confidence and rank
    pub base_score: f64,

    /// Retention score, attached by the forgetting scorer
    pub forgetting_score: f64,

    /// Blend of base and retention scores
    pub combined_score: f64,

    /// Backend that contributed this document first
    pub source_backend: String,

    /// Factor breakdown, attached by the forgetting scorer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}

impl RetrievalResult {
    /// Create an unscored candidate
    pub fn candidate(
        doc_id: impl Into<String>,
        base_score: f64,
        source_backend: impl Into<String>,
    ) -> Self {
        Self {
            doc_id: doc_id.into(),
            base_score,
            forgetting_score: 0.0,
            combined_score: base_score,
            source_backend: source_backend.into(),
            breakdown: None,
        }
    }
}

/// Envelope returned by [`FusionEngine::execute`](crate::fusion::FusionEngine::execute).
///
/// Same shape as [`BackendResponse`] plus the ranked, retention-scored results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct QueryResponse {
    /// Human readable answer
    pub answer: String,

    /// Overall confidence in [0, 1]
    pub confidence: f64,

    /// Number of documents that survived forgetting
    pub result_count: usize,

    /// Surviving document ids, best first
    pub entities: Vec<String>,

    /// Backend (or strategy) that produced the answer
    pub source: String,

    /// Strategy extras, including per-backend sub-results
    pub details: Details,

    /// Ranked results with scores
    pub results: Vec<RetrievalResult>,
}

/// Envelope returned by
/// [`FusionEngine::contextual_query`](crate::fusion::FusionEngine::contextual_query).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextualQueryResponse {
    /// The query text
    pub query: String,

    /// Query type used for weighting
    pub query_type: String,

    /// Ranked results with scores
    pub results: Vec<RetrievalResult>,

    /// Number of results
    pub result_count: usize,

    /// Confidence of the underlying backend answer
    pub confidence: f64,

    /// Wall clock time in seconds
    pub response_time: f64,

    /// Whether the forgetting filter ran
    pub forgetting_applied: bool,

    /// Retention score for each result, in result order
    pub contextual_scores: Vec<f64>,
}
