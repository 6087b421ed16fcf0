//! Forgetting-aware scoring of retrieval results
//!
//! This module decides whether a retrieved document is still worth showing.
//! Each document gets a retention score in [0, 1]:
//!
//! ```text
//! forgetting_score = w_r * recency + w_u * usage + w_c * relevance
//! recency          = max(0, 1 - days_since_last_access / 365)   (1.0 if never accessed)
//! usage            = min(1, access_count / 10)
//! relevance        = relevance to the last query that retrieved it
//! ```
//!
//! Candidates scoring below the threshold are dropped; the rest are re-ranked
//! by retention score.
//!
//! # Example
//!
//! ```no_run
//! use bimfuse::search::{ForgettingConfig, ForgettingScorer};
//! use bimfuse::models::RetrievalResult;
//! use chrono::Utc;
//!
//! let scorer = ForgettingScorer::try_new(ForgettingConfig::default()).unwrap();
//! let kept = scorer.apply(
//!     vec![RetrievalResult::candidate("2O2Fr$t4X7Zf8NOew3FLOH", 0.8, "lexical")],
//!     Utc::now(),
//! );
//! assert_eq!(kept.len(), 1);
//! ```

pub mod scorer;
pub mod scoring;

pub use scorer::{ForgettingScorer, UsageStats};
pub use scoring::{ForgettingConfig, ForgettingWeights};
