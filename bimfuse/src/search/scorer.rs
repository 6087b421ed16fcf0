//! Forgetting scorer
//!
//! Combines recency, usage and context relevance into a retention score per
//! document and uses it to filter and re-rank retrieval candidates.

use crate::config::ConfigError;
use crate::models::usage::sanitize_unit;
use crate::models::{RetrievalResult, ScoreBreakdown};
use crate::selector::QueryType;
use crate::storage::UsageStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::scoring::{ForgettingConfig, ForgettingWeights};

/// Slack applied to the threshold comparison so that a mathematically
/// perfect score survives `threshold = 1` despite rounding.
const THRESHOLD_EPSILON: f64 = 1e-9;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Aggregate view over the usage store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UsageStats {
    /// Documents with a usage record
    pub tracked_documents: usize,
    /// Sum of all access counts
    pub total_accesses: u64,
    /// Tracked documents currently below the threshold
    pub forgotten_documents: usize,
    /// Mean retention score over tracked documents (0 when empty)
    pub mean_forgetting_score: f64,
}

/// Retention scorer that owns the usage store.
///
/// Reads (`score`, `breakdown`, `should_forget`, `apply`) never mutate state,
/// so scoring twice without intervening accesses yields identical values.
#[derive(Debug, Clone)]
pub struct ForgettingScorer {
    config: ForgettingConfig,
    usage: UsageStore,
}

impl ForgettingScorer {
    /// Create a scorer with an empty usage store, rejecting invalid configuration
    pub fn try_new(config: ForgettingConfig) -> Result<Self, ConfigError> {
        Self::with_usage(config, UsageStore::new())
    }

    /// Create a scorer over an existing usage store
    pub fn with_usage(config: ForgettingConfig, usage: UsageStore) -> Result<Self, ConfigError> {
        config.validate().map_err(ConfigError::ValidationError)?;
        Ok(Self { config, usage })
    }

    /// Get reference to the configuration
    pub fn config(&self) -> &ForgettingConfig {
        &self.config
    }

    /// Get reference to the usage store
    pub fn usage(&self) -> &UsageStore {
        &self.usage
    }

    /// The forgetting threshold
    pub fn threshold(&self) -> f64 {
        self.config.threshold
    }

    /// Weights for a query type, falling back to the default triple
    pub fn weights_for(&self, query_type: QueryType) -> ForgettingWeights {
        self.config
            .query_type_weights
            .get(query_type.as_str())
            .copied()
            .unwrap_or(self.config.weights)
    }

    /// Factor breakdown of a document's score using the default weights
    pub fn breakdown(&self, doc_id: &str, now: DateTime<Utc>) -> ScoreBreakdown {
        self.breakdown_with(doc_id, now, self.config.weights)
    }

    /// Factor breakdown of a document's score with explicit weights
    pub fn breakdown_with(
        &self,
        doc_id: &str,
        now: DateTime<Utc>,
        weights: ForgettingWeights,
    ) -> ScoreBreakdown {
        let record = self.usage.get(doc_id);

        // Documents never retrieved are not penalised for recency.
        let recency = match record.and_then(|r| r.last_access) {
            Some(last_access) => self.calculate_recency(last_access, now),
            None => 1.0,
        };
        let usage = record
            .map(|r| self.calculate_usage(r.access_count))
            .unwrap_or(0.0);
        let relevance = record
            .map(|r| sanitize_unit(r.context_relevance))
            .unwrap_or(0.0);

        let score = weights.recency * recency + weights.usage * usage + weights.relevance * relevance;

        ScoreBreakdown {
            recency,
            usage,
            relevance,
            recency_weight: weights.recency,
            usage_weight: weights.usage,
            relevance_weight: weights.relevance,
            forgetting_score: sanitize_unit(score),
        }
    }

    /// Retention score of a document, in [0, 1]
    pub fn score(&self, doc_id: &str, now: DateTime<Utc>) -> f64 {
        self.breakdown(doc_id, now).forgetting_score
    }

    /// Whether a document scores below the threshold
    pub fn should_forget(&self, doc_id: &str, now: DateTime<Utc>) -> bool {
        self.is_below_threshold(self.score(doc_id, now))
    }

    /// Drop forgotten candidates, attach retention scores and sort by them.
    pub fn apply(&self, candidates: Vec<RetrievalResult>, now: DateTime<Utc>) -> Vec<RetrievalResult> {
        self.apply_with(candidates, now, self.config.weights)
    }

    /// Like [`apply`](Self::apply) with the weights configured for a query type
    pub fn apply_for(
        &self,
        query_type: QueryType,
        candidates: Vec<RetrievalResult>,
        now: DateTime<Utc>,
    ) -> Vec<RetrievalResult> {
        self.apply_with(candidates, now, self.weights_for(query_type))
    }

    /// Score and sort candidates without dropping any
    pub fn rank(
        &self,
        candidates: Vec<RetrievalResult>,
        now: DateTime<Utc>,
        weights: ForgettingWeights,
    ) -> Vec<RetrievalResult> {
        let mut scored: Vec<_> = candidates
            .into_iter()
            .map(|candidate| self.attach(candidate, now, weights))
            .collect();
        scored.sort_by(compare_results);
        scored
    }

    fn apply_with(
        &self,
        candidates: Vec<RetrievalResult>,
        now: DateTime<Utc>,
        weights: ForgettingWeights,
    ) -> Vec<RetrievalResult> {
        let before = candidates.len();
        let survivors: Vec<_> = self
            .rank(candidates, now, weights)
            .into_iter()
            .filter(|result| !self.is_below_threshold(result.forgetting_score))
            .collect();

        if survivors.len() < before {
            tracing::debug!(
                dropped = before - survivors.len(),
                kept = survivors.len(),
                threshold = self.config.threshold,
                "Forgetting filter dropped candidates"
            );
        }
        survivors
    }

    /// Record that the given documents were retrieved with these relevances
    pub fn record_retrievals(&mut self, relevances: &[(String, f64)], now: DateTime<Utc>) {
        for (doc_id, relevance) in relevances {
            self.usage.record_access(doc_id, *relevance, now);
        }
    }

    /// Store the retention score computed for each result
    pub fn commit_scores(&mut self, results: &[RetrievalResult]) {
        for result in results {
            self.usage
                .set_forgetting_score(&result.doc_id, result.forgetting_score);
        }
    }

    /// Aggregate statistics over the usage store
    pub fn stats(&self, now: DateTime<Utc>) -> UsageStats {
        let scores: Vec<f64> = self
            .usage
            .iter()
            .map(|record| self.score(&record.doc_id, now))
            .collect();
        let forgotten = scores
            .iter()
            .filter(|score| self.is_below_threshold(**score))
            .count();
        let mean = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };

        UsageStats {
            tracked_documents: self.usage.len(),
            total_accesses: self.usage.total_accesses(),
            forgotten_documents: forgotten,
            mean_forgetting_score: mean,
        }
    }

    /// Replace the usage store (used when restoring a snapshot)
    pub fn replace_usage(&mut self, usage: UsageStore) {
        self.usage = usage;
    }

    /// Forget all usage history
    pub fn reset(&mut self) {
        self.usage.clear();
    }

    fn attach(
        &self,
        mut candidate: RetrievalResult,
        now: DateTime<Utc>,
        weights: ForgettingWeights,
    ) -> RetrievalResult {
        let breakdown = self.breakdown_with(&candidate.doc_id, now, weights);
        let blend = self.config.base_blend;
        candidate.forgetting_score = breakdown.forgetting_score;
        candidate.combined_score =
            blend * sanitize_unit(candidate.base_score) + (1.0 - blend) * breakdown.forgetting_score;
        candidate.breakdown = Some(breakdown);
        candidate
    }

    fn is_below_threshold(&self, score: f64) -> bool {
        score + THRESHOLD_EPSILON < self.config.threshold
    }

    /// Linear recency: 1 right after access, 0 once the horizon has passed
    fn calculate_recency(&self, last_access: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        let days = (now - last_access).num_seconds().max(0) as f64 / SECONDS_PER_DAY;
        (1.0 - days / self.config.recency_horizon_days).max(0.0)
    }

    /// Access count scaled against the saturation point, capped at 1
    fn calculate_usage(&self, access_count: u32) -> f64 {
        (access_count as f64 / self.config.usage_saturation as f64).min(1.0)
    }
}

impl Default for ForgettingScorer {
    fn default() -> Self {
        Self {
            config: ForgettingConfig::default(),
            usage: UsageStore::new(),
        }
    }
}

/// Descending retention score, then backend score, then id for a stable order.
fn compare_results(a: &RetrievalResult, b: &RetrievalResult) -> Ordering {
    b.forgetting_score
        .total_cmp(&a.forgetting_score)
        .then_with(|| b.base_score.total_cmp(&a.base_score))
        .then_with(|| a.doc_id.cmp(&b.doc_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn scorer_with(config: ForgettingConfig) -> ForgettingScorer {
        ForgettingScorer::try_new(config).unwrap()
    }

    fn candidate(id: &str, base: f64) -> RetrievalResult {
        RetrievalResult::candidate(id, base, "lexical")
    }

    #[test]
    fn test_unseen_document_keeps_full_recency() {
        let scorer = ForgettingScorer::default();
        let breakdown = scorer.breakdown("never-seen", Utc::now());
        assert_eq!(breakdown.recency, 1.0);
        assert_eq!(breakdown.usage, 0.0);
        assert_eq!(breakdown.relevance, 0.0);
        assert!((breakdown.forgetting_score - 0.4).abs() < 1e-12);
        assert!(!scorer.should_forget("never-seen", Utc::now()));
    }

    #[test]
    fn test_stale_single_access_is_forgotten() {
        let now = Utc::now();
        let mut scorer = ForgettingScorer::default();
        scorer.record_retrievals(&[("old-slab".to_string(), 0.0)], now - Duration::days(400));

        let breakdown = scorer.breakdown("old-slab", now);
        assert_eq!(breakdown.recency, 0.0);
        assert!((breakdown.usage - 0.1).abs() < 1e-12);
        assert_eq!(breakdown.relevance, 0.0);
        assert!((breakdown.forgetting_score - 0.03).abs() < 1e-9);
        assert!(scorer.should_forget("old-slab", now));
    }

    #[test]
    fn test_usage_saturates_at_ten_accesses() {
        let now = Utc::now();
        let mut scorer = ForgettingScorer::default();
        for _ in 0..25 {
            scorer.record_retrievals(&[("door".to_string(), 1.0)], now);
        }
        let breakdown = scorer.breakdown("door", now);
        assert_eq!(breakdown.usage, 1.0);
        assert!((breakdown.forgetting_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_recency_decays_linearly() {
        let now = Utc::now();
        let mut scorer = ForgettingScorer::default();
        scorer.record_retrievals(&[("beam".to_string(), 0.0)], now - Duration::days(73));
        let breakdown = scorer.breakdown("beam", now);
        assert!((breakdown.recency - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_apply_filters_and_sorts() {
        let now = Utc::now();
        let mut scorer = ForgettingScorer::default();
        scorer.record_retrievals(&[("stale".to_string(), 0.0)], now - Duration::days(500));
        for _ in 0..10 {
            scorer.record_retrievals(&[("hot".to_string(), 0.8)], now);
        }

        let results = scorer.apply(
            vec![candidate("stale", 0.9), candidate("fresh", 0.9), candidate("hot", 0.1)],
            now,
        );

        let ids: Vec<_> = results.iter().map(|r| r.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["hot", "fresh"]);
        assert!(results[0].forgetting_score >= results[1].forgetting_score);
        // base scores are left untouched
        assert_eq!(results[0].base_score, 0.1);
        assert!(results.iter().all(|r| r.breakdown.is_some()));
    }

    #[test]
    fn test_apply_never_invents_candidates() {
        let scorer = ForgettingScorer::default();
        assert!(scorer.apply(Vec::new(), Utc::now()).is_empty());
    }

    #[test]
    fn test_zero_threshold_keeps_everything() {
        let now = Utc::now();
        let mut scorer = scorer_with(ForgettingConfig {
            threshold: 0.0,
            ..Default::default()
        });
        scorer.record_retrievals(&[("ancient".to_string(), 0.0)], now - Duration::days(9000));
        assert!(scorer.score("ancient", now) < 0.05);
        let results = scorer.apply(vec![candidate("ancient", 0.0)], now);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_full_threshold_keeps_only_perfect_scores() {
        let now = Utc::now();
        let mut scorer = scorer_with(ForgettingConfig {
            threshold: 1.0,
            ..Default::default()
        });
        for _ in 0..10 {
            scorer.record_retrievals(&[("perfect".to_string(), 1.0)], now);
        }
        scorer.record_retrievals(&[("almost".to_string(), 1.0)], now);

        let results = scorer.apply(
            vec![candidate("perfect", 0.5), candidate("almost", 0.5), candidate("new", 0.5)],
            now,
        );
        let ids: Vec<_> = results.iter().map(|r| r.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["perfect"]);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let now = Utc::now();
        let mut scorer = ForgettingScorer::default();
        scorer.record_retrievals(&[("wall".to_string(), 0.6)], now - Duration::days(10));

        let first = scorer.score("wall", now);
        let second = scorer.score("wall", now);
        assert_eq!(first, second);

        let a = scorer.apply(vec![candidate("wall", 0.3)], now);
        let b = scorer.apply(vec![candidate("wall", 0.3)], now);
        assert_eq!(a, b);
    }

    #[test]
    fn test_query_type_weights_override_defaults() {
        let now = Utc::now();
        let mut config = ForgettingConfig::default();
        config
            .query_type_weights
            .insert("temporal".to_string(), ForgettingWeights::new(1.0, 0.0, 0.0));
        let mut scorer = scorer_with(config);
        scorer.record_retrievals(&[("slab".to_string(), 0.0)], now - Duration::days(400));

        assert!(scorer.apply_for(QueryType::Temporal, vec![candidate("slab", 1.0)], now).is_empty());
        assert_eq!(scorer.weights_for(QueryType::Keyword), ForgettingWeights::default());
    }

    #[test]
    fn test_combined_score_blends_base_and_retention() {
        let scorer = ForgettingScorer::default();
        let results = scorer.rank(vec![candidate("x", 0.8)], Utc::now(), ForgettingWeights::default());
        // 0.5 * 0.8 + 0.5 * 0.4
        assert!((results[0].combined_score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_commit_scores_only_touches_tracked_documents() {
        let now = Utc::now();
        let mut scorer = ForgettingScorer::default();
        scorer.record_retrievals(&[("tracked".to_string(), 0.5)], now);
        let results = scorer.apply(vec![candidate("tracked", 0.5), candidate("other", 0.5)], now);
        scorer.commit_scores(&results);

        let stored = scorer.usage().get("tracked").unwrap().forgetting_score;
        assert!((stored - scorer.score("tracked", now)).abs() < 1e-12);
        assert!(scorer.usage().get("other").is_none());
    }

    #[test]
    fn test_stats() {
        let now = Utc::now();
        let mut scorer = ForgettingScorer::default();
        assert_eq!(scorer.stats(now).mean_forgetting_score, 0.0);

        scorer.record_retrievals(&[("stale".to_string(), 0.0)], now - Duration::days(400));
        scorer.record_retrievals(&[("fresh".to_string(), 1.0)], now);
        let stats = scorer.stats(now);
        assert_eq!(stats.tracked_documents, 2);
        assert_eq!(stats.total_accesses, 2);
        assert_eq!(stats.forgotten_documents, 1);
    }

    #[test]
    fn test_invalid_config_is_refused() {
        let config = ForgettingConfig {
            threshold: 1.5,
            ..Default::default()
        };
        assert!(ForgettingScorer::try_new(config).is_err());
    }
}
