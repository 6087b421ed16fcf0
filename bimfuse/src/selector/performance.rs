//! Rolling performance histories per query type and per backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use super::classifier::QueryType;
use crate::models::usage::sanitize_unit;

/// Result count at which the volume component saturates
const RESULT_COUNT_SATURATION: f64 = 10.0;

/// Response time, in seconds, at which the latency component reaches 0
const RESPONSE_TIME_CEILING_SECS: f64 = 5.0;

/// Score one backend call:
/// `0.4 * confidence + 0.3 * min(1, results / 10) + 0.3 * max(0, 1 - seconds / 5)`.
pub fn performance_score(confidence: f64, result_count: usize, response_time: Duration) -> f64 {
    let volume = (result_count as f64 / RESULT_COUNT_SATURATION).min(1.0);
    let latency = (1.0 - response_time.as_secs_f64() / RESPONSE_TIME_CEILING_SECS).max(0.0);
    sanitize_unit(0.4 * sanitize_unit(confidence) + 0.3 * volume + 0.3 * latency)
}

/// One observed backend outcome
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceSample {
    /// Query type of the query that produced the sample
    pub query_type: QueryType,
    /// Backend that answered
    pub backend_name: String,
    /// Performance score in [0, 1]
    pub score: f64,
    /// When the sample was taken
    pub timestamp: DateTime<Utc>,
}

/// Two parallel bounded FIFO histories of [`PerformanceSample`]s.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceHistory {
    capacity: usize,
    by_query_type: BTreeMap<String, VecDeque<PerformanceSample>>,
    by_backend: BTreeMap<String, VecDeque<PerformanceSample>>,
}

impl PerformanceHistory {
    /// Create empty histories holding at most `capacity` samples per key
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            by_query_type: BTreeMap::new(),
            by_backend: BTreeMap::new(),
        }
    }

    /// Samples kept per key
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a sample to both histories
    pub fn record(&mut self, sample: PerformanceSample) {
        let capacity = self.capacity;
        push_bounded(
            self.by_query_type
                .entry(sample.query_type.as_str().to_string())
                .or_default(),
            sample.clone(),
            capacity,
        );
        push_bounded(
            self.by_backend
                .entry(sample.backend_name.clone())
                .or_default(),
            sample,
            capacity,
        );
    }

    /// Samples for a query type, oldest first
    pub fn for_query_type(&self, query_type: QueryType) -> impl Iterator<Item = &PerformanceSample> {
        self.by_query_type
            .get(query_type.as_str())
            .into_iter()
            .flatten()
    }

    /// Samples for a backend, oldest first
    pub fn for_backend(&self, backend: &str) -> impl Iterator<Item = &PerformanceSample> {
        self.by_backend.get(backend).into_iter().flatten()
    }

    /// Number of samples for a query type
    pub fn query_type_len(&self, query_type: QueryType) -> usize {
        self.by_query_type
            .get(query_type.as_str())
            .map_or(0, VecDeque::len)
    }

    /// Number of samples for a backend
    pub fn backend_len(&self, backend: &str) -> usize {
        self.by_backend.get(backend).map_or(0, VecDeque::len)
    }

    /// Mean of every kept sample for a query type
    pub fn query_type_mean(&self, query_type: QueryType) -> Option<f64> {
        mean(self.for_query_type(query_type).map(|s| s.score))
    }

    /// Mean of every kept sample for a backend
    pub fn backend_mean(&self, backend: &str) -> Option<f64> {
        mean(self.for_backend(backend).map(|s| s.score))
    }

    /// Mean of the newest `n` samples for a backend, if it has at least `n`
    pub fn recent_backend_mean(&self, backend: &str, n: usize) -> Option<f64> {
        let samples = self.by_backend.get(backend)?;
        if n == 0 || samples.len() < n {
            return None;
        }
        mean(samples.iter().skip(samples.len() - n).map(|s| s.score))
    }

    /// Every stored sample, per query type then per backend
    pub fn samples(&self) -> impl Iterator<Item = &PerformanceSample> {
        self.by_query_type
            .values()
            .chain(self.by_backend.values())
            .flatten()
    }

    /// Re-bound the histories to a new capacity, evicting the oldest samples
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        let capacity = self.capacity;
        for samples in self
            .by_query_type
            .values_mut()
            .chain(self.by_backend.values_mut())
        {
            while samples.len() > capacity {
                samples.pop_front();
            }
        }
        self
    }

    /// Drop all samples
    pub fn clear(&mut self) {
        self.by_query_type.clear();
        self.by_backend.clear();
    }
}

fn push_bounded(samples: &mut VecDeque<PerformanceSample>, sample: PerformanceSample, capacity: usize) {
    while samples.len() >= capacity {
        samples.pop_front();
    }
    samples.push_back(sample);
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
