//! Epsilon-greedy backend selection driven by observed performance

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use super::classifier::{QueryType, classify};
use super::performance::{PerformanceHistory, PerformanceSample, performance_score};
use super::weights::AdaptiveWeights;
use crate::config::{ConfigError, SelectorConfig};

/// Selection policy currently in effect for a query type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SelectionState {
    /// Not enough samples yet; the default backend is used
    Collecting,
    /// Mean performance is good; the default backend is exploited
    Stable,
    /// Mean performance is poor; other backends are tried with probability epsilon
    Exploring,
}

impl fmt::Display for SelectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Collecting => "collecting",
            Self::Stable => "stable",
            Self::Exploring => "exploring",
        };
        f.write_str(name)
    }
}

/// Outcome of [`AdaptiveSelector::select`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Query type the selection was made for
    pub query_type: QueryType,
    /// Chosen backend
    pub backend: String,
    /// Default backend for the query type
    pub default_backend: String,
    /// State the query type was in when selecting
    pub state: SelectionState,
    /// Whether an exploratory (non-default) backend was picked
    pub explored: bool,
}

/// Per-query-type line of a [`PerformanceSummary`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryTypeSummary {
    pub samples: usize,
    pub mean_score: Option<f64>,
    pub state: SelectionState,
    pub default_backend: Option<String>,
}

/// Per-backend line of a [`PerformanceSummary`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendSummary {
    pub samples: usize,
    pub mean_score: Option<f64>,
    pub weight: f64,
}

/// Snapshot of what the selector has learned so far
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PerformanceSummary {
    pub query_types: BTreeMap<String, QueryTypeSummary>,
    pub backends: BTreeMap<String, BackendSummary>,
}

/// Picks a backend per query and learns backend weights online.
///
/// Exploration draws from an owned [`StdRng`], seeded from
/// `selector.seed` when set so that runs are reproducible.
#[derive(Debug)]
pub struct AdaptiveSelector {
    config: SelectorConfig,
    backends: Vec<String>,
    fallback_backend: Option<String>,
    weights: AdaptiveWeights,
    history: PerformanceHistory,
    rng: StdRng,
}

impl AdaptiveSelector {
    /// Create a selector over the given backend names
    pub fn try_new(config: SelectorConfig, backends: Vec<String>) -> Result<Self, ConfigError> {
        config.validate().map_err(ConfigError::ValidationError)?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let history = PerformanceHistory::new(config.performance_window);
        let weights = AdaptiveWeights::uniform(backends.iter().cloned());
        let fallback_backend = backends.first().cloned();

        Ok(Self {
            config,
            backends,
            fallback_backend,
            weights,
            history,
            rng,
        })
    }

    /// Backend used when a query type's default is not registered
    pub fn with_fallback(mut self, backend: impl Into<String>) -> Self {
        let backend = backend.into();
        if self.backends.contains(&backend) {
            self.fallback_backend = Some(backend);
        }
        self
    }

    /// Get reference to the configuration
    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Registered backend names
    pub fn backends(&self) -> &[String] {
        &self.backends
    }

    /// Classify a query string
    pub fn classify(&self, query: &str) -> QueryType {
        classify(query)
    }

    /// Default backend for a query type.
    ///
    /// Falls back to the fallback backend when the configured default is
    /// missing or not registered. `None` only when no backend is registered.
    pub fn default_backend(&self, query_type: QueryType) -> Option<&str> {
        self.config
            .default_backends
            .get(query_type.as_str())
            .filter(|name| self.backends.contains(name))
            .or(self.fallback_backend.as_ref())
            .map(String::as_str)
    }

    /// Current selection state for a query type
    pub fn selection_state(&self, query_type: QueryType) -> SelectionState {
        if self.history.query_type_len(query_type) < self.config.min_samples {
            return SelectionState::Collecting;
        }
        match self.history.query_type_mean(query_type) {
            Some(mean) if mean >= self.config.stability_threshold => SelectionState::Stable,
            _ => SelectionState::Exploring,
        }
    }

    /// Choose the backend for a query type
    pub fn select(&mut self, query_type: QueryType) -> Option<Selection> {
        let default_backend = self.default_backend(query_type)?.to_string();
        let state = self.selection_state(query_type);

        let mut backend = default_backend.clone();
        let mut explored = false;

        if state == SelectionState::Exploring {
            let alternatives: Vec<&String> = self
                .backends
                .iter()
                .filter(|name| **name != default_backend)
                .collect();
            if !alternatives.is_empty()
                && self.rng.random::<f64>() < self.config.exploration_rate
            {
                let pick = self.rng.random_range(0..alternatives.len());
                backend = alternatives[pick].clone();
                explored = true;
            }
        }

        tracing::debug!(
            query_type = %query_type,
            state = %state,
            backend = %backend,
            explored,
            "Selected backend"
        );

        Some(Selection {
            query_type,
            backend,
            default_backend,
            state,
            explored,
        })
    }

    /// Score a backend outcome and append it to both histories.
    ///
    /// Returns the recorded performance score.
    pub fn record_performance(
        &mut self,
        query_type: QueryType,
        backend: &str,
        confidence: f64,
        result_count: usize,
        response_time: Duration,
        now: DateTime<Utc>,
    ) -> f64 {
        let score = performance_score(confidence, result_count, response_time);
        self.history.record(PerformanceSample {
            query_type,
            backend_name: backend.to_string(),
            score,
            timestamp: now,
        });
        score
    }

    /// Blend recent per-backend performance into the weights
    pub fn update_weights(&mut self) {
        let window = self.config.weight_update_samples;
        let means: BTreeMap<String, f64> = self
            .backends
            .iter()
            .filter_map(|name| {
                self.history
                    .recent_backend_mean(name, window)
                    .map(|mean| (name.clone(), mean))
            })
            .collect();

        self.weights.update(&means, self.config.learning_rate);
        tracing::trace!(weights = ?self.weights, "Updated adaptive weights");
    }

    /// Record one backend outcome and update the weights
    pub fn update_performance(
        &mut self,
        query_type: QueryType,
        backend: &str,
        confidence: f64,
        result_count: usize,
        response_time: Duration,
        now: DateTime<Utc>,
    ) -> f64 {
        let score =
            self.record_performance(query_type, backend, confidence, result_count, response_time, now);
        self.update_weights();
        score
    }

    /// Current backend weights
    pub fn weights(&self) -> &AdaptiveWeights {
        &self.weights
    }

    /// Performance histories
    pub fn history(&self) -> &PerformanceHistory {
        &self.history
    }

    /// Summarize per-type and per-backend performance
    pub fn performance_summary(&self) -> PerformanceSummary {
        let query_types = QueryType::CLASSIFIED
            .iter()
            .chain(std::iter::once(&QueryType::General))
            .filter(|qt| self.history.query_type_len(**qt) > 0)
            .map(|qt| {
                let summary = QueryTypeSummary {
                    samples: self.history.query_type_len(*qt),
                    mean_score: self.history.query_type_mean(*qt),
                    state: self.selection_state(*qt),
                    default_backend: self.default_backend(*qt).map(str::to_string),
                };
                (qt.as_str().to_string(), summary)
            })
            .collect();

        let backends = self
            .backends
            .iter()
            .map(|name| {
                let summary = BackendSummary {
                    samples: self.history.backend_len(name),
                    mean_score: self.history.backend_mean(name),
                    weight: self.weights.get(name),
                };
                (name.clone(), summary)
            })
            .collect();

        PerformanceSummary {
            query_types,
            backends,
        }
    }

    /// Replace learned state, re-bounding histories and realigning weights
    /// with the registered backends.
    pub fn restore(&mut self, history: PerformanceHistory, mut weights: AdaptiveWeights) {
        self.history = history.with_capacity(self.config.performance_window);
        weights.align_with(&self.backends);
        self.weights = weights;
    }

    /// Forget all samples and reset weights to uniform
    pub fn reset(&mut self) {
        self.history.clear();
        self.weights = AdaptiveWeights::uniform(self.backends.iter().cloned());
    }
}
