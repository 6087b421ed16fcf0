//! Fusion engine: the query entry point
//!
//! A query runs through these steps:
//!
//! 1. call one or more backends, according to the [`FusionStrategy`]
//! 2. turn the returned document ids into [`RetrievalResult`] candidates
//! 3. filter and re-rank them with the [`ForgettingScorer`]
//! 4. update the context window and usage records with the surviving documents
//! 5. feed backend outcomes into the [`AdaptiveSelector`] (all strategies but basic)
//!
//! All learned state sits behind one async mutex that is held for the whole
//! query, so concurrent queries never interleave their updates. Backend calls
//! inside a query still run concurrently.

use crate::backends::{BackendOutcome, BackendRegistry, RetrievalBackend};
use crate::config::{BimfuseConfig, ConfigError, validate_config};
use crate::context::ContextTracker;
use crate::models::usage::sanitize_unit;
use crate::models::{
    BackendResponse, ContextualQueryResponse, Details, QueryResponse, RetrievalResult,
};
use crate::search::{ForgettingScorer, UsageStats};
use crate::selector::{AdaptiveSelector, AdaptiveWeights, PerformanceSummary, QueryType};
use crate::storage::{
    DocumentSource, InMemoryDocumentSource, LoadOutcome, SNAPSHOT_VERSION, StateSnapshot,
    UsageStore,
};
use crate::{BimfuseError, Result};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{Instrument, debug, info, info_span, warn};

use super::strategy::FusionStrategy;

/// Mutable state owned by the engine
#[derive(Debug)]
struct CoreState {
    scorer: ForgettingScorer,
    context: ContextTracker,
    selector: AdaptiveSelector,
}

/// What a strategy produced before forgetting and bookkeeping
#[derive(Debug)]
struct Fused {
    answer: String,
    confidence: f64,
    source: String,
    candidates: Vec<RetrievalResult>,
    details: Details,
}

impl Fused {
    fn failure(source: &str, answer: String, details: Details) -> Self {
        Self {
            answer,
            confidence: 0.0,
            source: source.to_string(),
            candidates: Vec::new(),
            details,
        }
    }
}

/// Combines retrieval backends into one ranked, retention-aware answer.
///
/// # Examples
///
/// ```no_run
/// use bimfuse::backends::StaticBackend;
/// use bimfuse::fusion::{FusionEngine, FusionStrategy};
/// use bimfuse::models::BackendResponse;
/// use std::sync::Arc;
///
/// # async fn example() -> bimfuse::Result<()> {
/// let engine = FusionEngine::builder()
///     .backend(Arc::new(StaticBackend::new(
///         "lexical",
///         BackendResponse::new("lexical", "Wall W-01", 0.8).with_entities(["2O2Fr$t4X7Zf8NOew3FLOH"]),
///     )))
///     .build()?;
///
/// let response = engine.execute("exterior walls", FusionStrategy::Ranked).await;
/// println!("{} ({:.2})", response.answer, response.confidence);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FusionEngine {
    config: BimfuseConfig,
    registry: BackendRegistry,
    documents: Arc<dyn DocumentSource>,
    primary_backend: Option<String>,
    state: Mutex<CoreState>,
}

impl FusionEngine {
    /// Start building an engine
    pub fn builder() -> FusionEngineBuilder {
        FusionEngineBuilder::new()
    }

    /// Get reference to the configuration
    pub fn config(&self) -> &BimfuseConfig {
        &self.config
    }

    /// Names of the registered backends
    pub fn backend_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Backend used by the basic strategy
    pub fn primary_backend(&self) -> Option<&str> {
        self.primary_backend.as_deref()
    }

    /// Run a query with the configured default strategy
    pub async fn query(&self, query: &str) -> QueryResponse {
        self.execute(query, self.config.fusion.default_strategy)
            .await
    }

    /// Run a query with an explicit strategy.
    ///
    /// Never fails: backend errors are folded into a zero-confidence envelope
    /// whose `answer` explains what went wrong.
    pub async fn execute(&self, query: &str, strategy: FusionStrategy) -> QueryResponse {
        let span = info_span!("fusion.execute", strategy = %strategy);
        self.execute_inner(query, strategy).instrument(span).await
    }

    async fn execute_inner(&self, query: &str, strategy: FusionStrategy) -> QueryResponse {
        let started = Instant::now();
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let query_type = state.selector.classify(query);

        let fused = match strategy {
            FusionStrategy::Basic => self.run_basic(query).await,
            FusionStrategy::Ranked => self.run_ranked(&mut state, query_type, query, now).await,
            FusionStrategy::Weighted => {
                self.run_weighted(&mut state, query_type, query, now).await
            }
            FusionStrategy::Adaptive => {
                self.run_adaptive(&mut state, query_type, query, now).await
            }
        };

        let (results, forgetting_applied) =
            self.apply_forgetting(&state, query_type, fused.candidates, now);
        self.record_retrieval(&mut state, query, &results, now).await;

        let mut details = fused.details;
        details.insert("strategy".to_string(), json!(strategy.as_str()));
        details.insert("query_type".to_string(), json!(query_type.as_str()));
        details.insert("forgetting_applied".to_string(), json!(forgetting_applied));
        details.insert(
            "performance_recorded".to_string(),
            json!(strategy.records_performance()),
        );

        info!(
            query_type = %query_type,
            source = %fused.source,
            confidence = fused.confidence,
            results = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Query executed"
        );

        QueryResponse {
            answer: fused.answer,
            confidence: fused.confidence,
            result_count: results.len(),
            entities: results.iter().map(|r| r.doc_id.clone()).collect(),
            source: fused.source,
            details,
            results,
        }
    }

    /// Query the default backend for a query type and return retention-scored
    /// results.
    ///
    /// `query_type` is one of the classifier's type names or `"general"`;
    /// unknown names are treated as `"general"`, which uses the primary
    /// backend and the default forgetting weights. No performance sample is
    /// recorded.
    pub async fn contextual_query(&self, query: &str, query_type: &str) -> ContextualQueryResponse {
        let started = Instant::now();
        let query_type = QueryType::parse_lenient(query_type);
        let mut state = self.state.lock().await;
        let now = Utc::now();

        let (confidence, candidates) = match state.selector.default_backend(query_type) {
            Some(backend) => {
                let backend = backend.to_string();
                let outcome = self.registry.invoke(&backend, query).await;
                let response = outcome.response();
                (response.confidence, rank_candidates(&response, &backend))
            }
            None => {
                warn!("No backend registered; contextual query returns nothing");
                (0.0, Vec::new())
            }
        };

        let (results, forgetting_applied) =
            self.apply_forgetting(&state, query_type, candidates, now);
        self.record_retrieval(&mut state, query, &results, now).await;

        let contextual_scores = results.iter().map(|r| r.forgetting_score).collect();
        ContextualQueryResponse {
            query: query.to_string(),
            query_type: query_type.as_str().to_string(),
            result_count: results.len(),
            results,
            confidence,
            response_time: started.elapsed().as_secs_f64(),
            forgetting_applied,
            contextual_scores,
        }
    }

    /// Aggregate usage statistics
    pub async fn usage_stats(&self) -> UsageStats {
        self.state.lock().await.scorer.stats(Utc::now())
    }

    /// What the selector has learned so far
    pub async fn performance_report(&self) -> PerformanceSummary {
        self.state.lock().await.selector.performance_summary()
    }

    /// Current adaptive weights
    pub async fn weights(&self) -> AdaptiveWeights {
        self.state.lock().await.selector.weights().clone()
    }

    /// Number of queries in the context window
    pub async fn context_len(&self) -> usize {
        self.state.lock().await.context.len()
    }

    /// Clear usage, context and selector state
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        reset_state(&mut state);
        info!("Engine state reset");
    }

    /// Capture the current state as a snapshot
    pub async fn snapshot(&self) -> StateSnapshot {
        let state = self.state.lock().await;
        self.snapshot_of(&state)
    }

    /// Write the current state to `path`
    pub async fn save_state(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let state = self.state.lock().await;
        let snapshot = self.snapshot_of(&state);
        snapshot.write(path).await?;
        info!(
            path = %path.display(),
            documents = snapshot.usage.len(),
            contexts = snapshot.context.len(),
            "State saved"
        );
        Ok(())
    }

    /// Replace the current state with the snapshot at `path`.
    ///
    /// An unreadable, corrupt or newer-schema snapshot never fails the call:
    /// state is reset to empty and the reason is returned.
    pub async fn load_state(&self, path: impl AsRef<Path>) -> LoadOutcome {
        let path = path.as_ref();
        let mut state = self.state.lock().await;

        match StateSnapshot::read(path).await {
            Ok(snapshot) => {
                if snapshot.config != self.config {
                    debug!("Snapshot was saved under a different configuration; keeping the current one");
                }
                let outcome = LoadOutcome::Restored {
                    saved_at: snapshot.saved_at,
                    documents: snapshot.usage.len(),
                    contexts: snapshot.context.len(),
                };
                state
                    .scorer
                    .replace_usage(UsageStore::from_records(snapshot.usage));
                state.context.restore(snapshot.context);
                state.selector.restore(snapshot.performance, snapshot.weights);
                info!(path = %path.display(), "State restored");
                outcome
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    "Snapshot could not be loaded, continuing with empty state: {}",
                    e
                );
                reset_state(&mut state);
                LoadOutcome::Reset {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn snapshot_of(&self, state: &CoreState) -> StateSnapshot {
        StateSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            config: self.config.clone(),
            usage: state.scorer.usage().records(),
            context: state.context.history().cloned().collect(),
            performance: state.selector.history().clone(),
            weights: state.selector.weights().clone(),
        }
    }

    async fn run_basic(&self, query: &str) -> Fused {
        let Some(primary) = self.primary_backend.as_deref() else {
            return no_backends();
        };

        let outcome = self.registry.invoke(primary, query).await;
        let mut details = Details::new();
        details.insert("backends".to_string(), json!([outcome_details(&outcome)]));

        match &outcome.result {
            Ok(response) => Fused {
                answer: response.answer.clone(),
                confidence: response.confidence,
                source: outcome.backend.clone(),
                candidates: rank_candidates(response, &outcome.backend),
                details,
            },
            Err(e) => Fused::failure(
                &outcome.backend,
                format!("Primary backend '{}' produced no result: {}", outcome.backend, e),
                details,
            ),
        }
    }

    async fn run_ranked(
        &self,
        state: &mut CoreState,
        query_type: QueryType,
        query: &str,
        now: DateTime<Utc>,
    ) -> Fused {
        if self.registry.is_empty() {
            return no_backends();
        }

        let outcomes = self.registry.fan_out(query).await;
        record_outcomes(state, query_type, &outcomes, now);

        let mut details = Details::new();
        details.insert("backends".to_string(), backend_details(&outcomes));

        let Some(best) = best_outcome(&outcomes) else {
            return Fused::failure("ranked", total_failure_answer(&outcomes), details);
        };
        let response = best.response();
        details.insert("selected".to_string(), json!(best.backend));

        Fused {
            answer: response.answer.clone(),
            confidence: response.confidence,
            source: best.backend.clone(),
            candidates: rank_candidates(&response, &best.backend),
            details,
        }
    }

    async fn run_weighted(
        &self,
        state: &mut CoreState,
        query_type: QueryType,
        query: &str,
        now: DateTime<Utc>,
    ) -> Fused {
        if self.registry.is_empty() {
            return no_backends();
        }

        let outcomes = self.registry.fan_out(query).await;
        // Combine with the weights in effect before this query's feedback.
        let weights = state.selector.weights().clone();
        record_outcomes(state, query_type, &outcomes, now);

        let combined_confidence = sanitize_unit(
            outcomes
                .iter()
                .map(|o| weights.get(&o.backend) * o.confidence())
                .sum(),
        );

        let mut details = Details::new();
        details.insert("backends".to_string(), backend_details(&outcomes));
        details.insert(
            "weights".to_string(),
            json!(weights.iter().collect::<BTreeMap<_, _>>()),
        );
        details.insert("combined_confidence".to_string(), json!(combined_confidence));

        let Some(best) = best_outcome(&outcomes) else {
            return Fused::failure("weighted", total_failure_answer(&outcomes), details);
        };

        let agreed = count_agreeing(best, &outcomes);
        let answer = format!(
            "{} (best: {}; {} of {} backends agreed)",
            best.response().answer,
            best.backend,
            agreed,
            outcomes.len()
        );
        details.insert("selected".to_string(), json!(best.backend));
        details.insert("agreed".to_string(), json!(agreed));

        Fused {
            answer,
            confidence: combined_confidence,
            source: "weighted".to_string(),
            candidates: merge_candidates(&outcomes, &weights),
            details,
        }
    }

    async fn run_adaptive(
        &self,
        state: &mut CoreState,
        query_type: QueryType,
        query: &str,
        now: DateTime<Utc>,
    ) -> Fused {
        let Some(selection) = state.selector.select(query_type) else {
            return no_backends();
        };

        let outcome = self.registry.invoke(&selection.backend, query).await;
        let performance = state.selector.update_performance(
            query_type,
            &outcome.backend,
            outcome.confidence(),
            outcome.result_count(),
            outcome.elapsed,
            now,
        );

        let mut details = Details::new();
        details.insert("backends".to_string(), json!([outcome_details(&outcome)]));
        details.insert("selected".to_string(), json!(selection.backend));
        details.insert("default_backend".to_string(), json!(selection.default_backend));
        details.insert("selection_state".to_string(), json!(selection.state));
        details.insert("explored".to_string(), json!(selection.explored));
        details.insert("performance".to_string(), json!(performance));

        match &outcome.result {
            Ok(response) => Fused {
                answer: response.answer.clone(),
                confidence: response.confidence,
                source: outcome.backend.clone(),
                candidates: rank_candidates(response, &outcome.backend),
                details,
            },
            Err(e) => Fused::failure(
                &outcome.backend,
                format!("Selected backend '{}' produced no result: {}", outcome.backend, e),
                details,
            ),
        }
    }

    /// Score candidates; drop forgotten ones only when forgetting is enabled
    fn apply_forgetting(
        &self,
        state: &CoreState,
        query_type: QueryType,
        candidates: Vec<RetrievalResult>,
        now: DateTime<Utc>,
    ) -> (Vec<RetrievalResult>, bool) {
        if self.config.fusion.forgetting_enabled {
            return (state.scorer.apply_for(query_type, candidates, now), true);
        }

        let weights = state.scorer.weights_for(query_type);
        let mut ranked = state.scorer.rank(candidates, now, weights);
        ranked.sort_by(|a, b| {
            b.base_score
                .total_cmp(&a.base_score)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        (ranked, false)
    }

    /// Update context and usage with the final result set
    async fn record_retrieval(
        &self,
        state: &mut CoreState,
        query: &str,
        results: &[RetrievalResult],
        now: DateTime<Utc>,
    ) {
        let ids: Vec<String> = results.iter().map(|r| r.doc_id.clone()).collect();
        let documents = self.documents.get_documents(&ids).await;

        let update = state.context.update(query, &ids, &documents, now);
        state.scorer.record_retrievals(&update.relevances, now);
        state.scorer.commit_scores(results);
    }
}

/// Builder for [`FusionEngine`]
#[derive(Debug, Default)]
pub struct FusionEngineBuilder {
    config: Option<BimfuseConfig>,
    backends: Vec<Arc<dyn RetrievalBackend>>,
    documents: Option<Arc<dyn DocumentSource>>,
}

impl FusionEngineBuilder {
    /// Create a builder with default configuration and no backends
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this configuration
    pub fn config(mut self, config: BimfuseConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Register a backend; registration order decides the fallback backend
    pub fn backend(mut self, backend: Arc<dyn RetrievalBackend>) -> Self {
        self.backends.push(backend);
        self
    }

    /// Resolve retrieved ids through this document source
    pub fn documents(mut self, documents: Arc<dyn DocumentSource>) -> Self {
        self.documents = Some(documents);
        self
    }

    /// Validate the configuration and build the engine
    pub fn build(self) -> Result<FusionEngine> {
        let config = self.config.unwrap_or_default();
        validate_config(&config)?;

        let mut registry =
            BackendRegistry::new(Duration::from_millis(config.fusion.backend_timeout_ms));
        for backend in self.backends {
            registry.register(backend);
        }
        let names = registry.names();

        let primary_backend = match &config.fusion.primary_backend {
            Some(primary) if !registry.contains(primary) => {
                return Err(BimfuseError::from(ConfigError::ValidationError(format!(
                    "fusion.primary_backend '{}' is not a registered backend",
                    primary
                ))));
            }
            Some(primary) => Some(primary.clone()),
            None => names.first().cloned(),
        };

        let scorer = ForgettingScorer::try_new(config.forgetting.clone())?;
        let context = ContextTracker::try_new(config.context.window_size)?;
        let mut selector = AdaptiveSelector::try_new(config.selector.clone(), names)?;
        if let Some(primary) = &primary_backend {
            selector = selector.with_fallback(primary.clone());
        }

        let documents = self
            .documents
            .unwrap_or_else(|| Arc::new(InMemoryDocumentSource::new()));

        debug!(
            backends = ?registry.names(),
            primary = ?primary_backend,
            "Fusion engine built"
        );

        Ok(FusionEngine {
            config,
            registry,
            documents,
            primary_backend,
            state: Mutex::new(CoreState {
                scorer,
                context,
                selector,
            }),
        })
    }
}

fn reset_state(state: &mut CoreState) {
    state.scorer.reset();
    state.context.clear();
    state.selector.reset();
}

fn no_backends() -> Fused {
    Fused::failure(
        "none",
        "No retrieval backend is registered".to_string(),
        Details::new(),
    )
}

/// Score of the document at `rank` in a list of `total`, scaled by confidence
fn positional_score(confidence: f64, rank: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    sanitize_unit(confidence) * (1.0 - rank as f64 / total as f64)
}

/// Distinct, non-empty ids of a response, best first
fn distinct_entities(response: &BackendResponse) -> Vec<&str> {
    let mut seen = HashSet::new();
    response
        .entities
        .iter()
        .map(String::as_str)
        .filter(|id| !id.is_empty() && seen.insert(*id))
        .collect()
}

/// Turn one backend's entity list into candidates
fn rank_candidates(response: &BackendResponse, backend: &str) -> Vec<RetrievalResult> {
    let ids = distinct_entities(response);
    let total = ids.len();
    ids.into_iter()
        .enumerate()
        .map(|(rank, id)| {
            RetrievalResult::candidate(id, positional_score(response.confidence, rank, total), backend)
        })
        .collect()
}

/// Merge every backend's entities; a document's base score is the
/// weight-blended positional score over the backends that returned it.
fn merge_candidates(outcomes: &[BackendOutcome], weights: &AdaptiveWeights) -> Vec<RetrievalResult> {
    let mut merged: Vec<RetrievalResult> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for outcome in outcomes {
        let Ok(response) = &outcome.result else {
            continue;
        };
        let weight = weights.get(&outcome.backend);
        let ids = distinct_entities(response);
        let total = ids.len();

        for (rank, id) in ids.into_iter().enumerate() {
            let contribution = weight * positional_score(response.confidence, rank, total);
            match index.get(id) {
                Some(&i) => merged[i].base_score += contribution,
                None => {
                    index.insert(id.to_string(), merged.len());
                    merged.push(RetrievalResult::candidate(id, contribution, &outcome.backend));
                }
            }
        }
    }

    for result in &mut merged {
        result.base_score = sanitize_unit(result.base_score);
        result.combined_score = result.base_score;
    }
    merged
}

/// Most confident successful outcome; ties keep registration order
fn best_outcome(outcomes: &[BackendOutcome]) -> Option<&BackendOutcome> {
    outcomes
        .iter()
        .filter(|o| o.is_ok())
        .fold(None, |best: Option<&BackendOutcome>, o| match best {
            Some(b) if b.confidence() >= o.confidence() => Some(b),
            _ => Some(o),
        })
}

/// Successful backends whose entities overlap the best backend's (including it)
fn count_agreeing(best: &BackendOutcome, outcomes: &[BackendOutcome]) -> usize {
    let best_ids: HashSet<String> = best.response().entities.into_iter().collect();
    outcomes
        .iter()
        .filter(|o| {
            o.backend == best.backend
                || o.result.as_ref().is_ok_and(|response| {
                    response.entities.iter().any(|id| best_ids.contains(id))
                })
        })
        .count()
}

/// Record one performance sample per backend, then update weights once
fn record_outcomes(
    state: &mut CoreState,
    query_type: QueryType,
    outcomes: &[BackendOutcome],
    now: DateTime<Utc>,
) {
    for outcome in outcomes {
        state.selector.record_performance(
            query_type,
            &outcome.backend,
            outcome.confidence(),
            outcome.result_count(),
            outcome.elapsed,
            now,
        );
    }
    state.selector.update_weights();
}

fn outcome_details(outcome: &BackendOutcome) -> Value {
    let response = outcome.response();
    let mut value = json!({
        "backend": outcome.backend,
        "answer": response.answer,
        "confidence": response.confidence,
        "result_count": response.result_count,
        "entities": response.entities,
        "elapsed_ms": outcome.elapsed.as_millis() as u64,
    });
    if let Some(error) = outcome.error() {
        value["error"] = json!(error);
    }
    value
}

fn backend_details(outcomes: &[BackendOutcome]) -> Value {
    Value::Array(outcomes.iter().map(outcome_details).collect())
}

fn total_failure_answer(outcomes: &[BackendOutcome]) -> String {
    let reasons: Vec<String> = outcomes.iter().filter_map(BackendOutcome::error).collect();
    format!("No backend produced a result: {}", reasons.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(backend: &str, confidence: f64, entities: &[&str]) -> BackendOutcome {
        BackendOutcome {
            backend: backend.to_string(),
            result: Ok(BackendResponse::new(backend, "answer", confidence)
                .with_entities(entities.iter().copied())),
            elapsed: Duration::ZERO,
        }
    }

    fn failed(backend: &str) -> BackendOutcome {
        BackendOutcome {
            backend: backend.to_string(),
            result: Err(crate::backends::BackendError::failed(backend, "down")),
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_rank_candidates_positional_scores() {
        let response = BackendResponse::new("lexical", "", 0.8).with_entities(["a", "b", "a", ""]);
        let candidates = rank_candidates(&response, "lexical");
        assert_eq!(candidates.len(), 2);
        assert!((candidates[0].base_score - 0.8).abs() < 1e-12);
        assert!((candidates[1].base_score - 0.4).abs() < 1e-12);
        assert_eq!(candidates[1].source_backend, "lexical");
    }

    #[test]
    fn test_best_outcome_prefers_confidence_then_order() {
        let outcomes = vec![
            failed("broken"),
            outcome("lexical", 0.6, &[]),
            outcome("vector", 0.6, &[]),
            outcome("graph", 0.2, &[]),
        ];
        assert_eq!(best_outcome(&outcomes).unwrap().backend, "lexical");
        assert!(best_outcome(&[failed("a"), failed("b")]).is_none());
    }

    #[test]
    fn test_merge_candidates_blends_by_weight() {
        let weights = AdaptiveWeights::uniform(["lexical", "vector"]);
        let outcomes = vec![
            outcome("lexical", 0.8, &["a", "b"]),
            outcome("vector", 0.6, &["b"]),
            failed("graph"),
        ];
        let merged = merge_candidates(&outcomes, &weights);
        assert_eq!(merged.len(), 2);
        // a: 0.5 * 0.8
        assert!((merged[0].base_score - 0.4).abs() < 1e-12);
        // b: 0.5 * 0.4 + 0.5 * 0.6
        assert!((merged[1].base_score - 0.5).abs() < 1e-12);
        assert_eq!(merged[1].source_backend, "lexical");
    }

    #[test]
    fn test_count_agreeing() {
        let outcomes = vec![
            outcome("lexical", 0.8, &["a", "b"]),
            outcome("vector", 0.6, &["b", "c"]),
            outcome("graph", 0.5, &["z"]),
            failed("broken"),
        ];
        assert_eq!(count_agreeing(&outcomes[0], &outcomes), 2);
    }
}
