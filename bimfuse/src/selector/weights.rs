//! Normalized weight distribution over backends

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sums this close to 1 are left untouched by [`AdaptiveWeights::normalize`]
const NORMALIZED_TOLERANCE: f64 = 1e-12;

/// Mapping `backend -> weight` that always sums to 1 when non-empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct AdaptiveWeights {
    weights: BTreeMap<String, f64>,
}

impl AdaptiveWeights {
    /// Equal weights over the given backends
    pub fn uniform<I, S>(backends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = backends.into_iter().map(Into::into).collect();
        let share = if names.is_empty() {
            0.0
        } else {
            1.0 / names.len() as f64
        };
        Self {
            weights: names.into_iter().map(|name| (name, share)).collect(),
        }
    }

    /// Weight of a backend, 0 when unknown
    pub fn get(&self, backend: &str) -> f64 {
        self.weights.get(backend).copied().unwrap_or(0.0)
    }

    /// Sum of all weights
    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Number of backends with a weight
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether no backend has a weight
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Iterate over `(backend, weight)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(name, weight)| (name.as_str(), *weight))
    }

    /// Blend observed performance into the weights.
    ///
    /// `means` holds the recent mean performance of every backend that has
    /// enough samples; backends absent from it keep their prior weight. Each
    /// present backend moves towards its share of the summed means by
    /// `learning_rate`, then all weights are renormalized.
    pub fn update(&mut self, means: &BTreeMap<String, f64>, learning_rate: f64) {
        let total: f64 = means
            .iter()
            .filter(|(name, _)| self.weights.contains_key(*name))
            .map(|(_, mean)| mean.max(0.0))
            .sum();

        if total > 0.0 {
            for (name, mean) in means {
                if let Some(weight) = self.weights.get_mut(name) {
                    let target = mean.max(0.0) / total;
                    *weight = (1.0 - learning_rate) * *weight + learning_rate * target;
                }
            }
        }
        self.normalize();
    }

    /// Make the weights cover exactly the given backends.
    ///
    /// Unknown entries are dropped, new backends start at the uniform share,
    /// and the result is renormalized.
    pub fn align_with(&mut self, backends: &[String]) {
        self.weights.retain(|name, _| backends.contains(name));
        let share = if backends.is_empty() {
            0.0
        } else {
            1.0 / backends.len() as f64
        };
        for name in backends {
            self.weights.entry(name.clone()).or_insert(share);
        }
        self.normalize();
    }

    /// Rescale to sum 1; falls back to uniform when the sum is not positive
    pub fn normalize(&mut self) {
        for weight in self.weights.values_mut() {
            if !weight.is_finite() || *weight < 0.0 {
                *weight = 0.0;
            }
        }
        let total = self.sum();
        if self.weights.is_empty() {
            return;
        }
        if total > 0.0 {
            if (total - 1.0).abs() <= NORMALIZED_TOLERANCE {
                return;
            }
            for weight in self.weights.values_mut() {
                *weight /= total;
            }
        } else {
            let share = 1.0 / self.weights.len() as f64;
            for weight in self.weights.values_mut() {
                *weight = share;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn means(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_uniform() {
        let weights = AdaptiveWeights::uniform(["lexical", "vector", "contextual", "graph"]);
        assert_eq!(weights.get("lexical"), 0.25);
        assert_eq!(weights.get("unknown"), 0.0);
        assert!((weights.sum() - 1.0).abs() < 1e-12);
        assert!(AdaptiveWeights::uniform(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_update_moves_towards_better_backend() {
        let mut weights = AdaptiveWeights::uniform(["lexical", "vector"]);
        weights.update(&means(&[("lexical", 0.9), ("vector", 0.1)]), 0.1);

        // 0.9 * 0.5 + 0.1 * 0.9 = 0.54
        assert!((weights.get("lexical") - 0.54).abs() < 1e-12);
        assert!((weights.get("vector") - 0.46).abs() < 1e-12);
        assert!((weights.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_backends_without_means_keep_prior_before_renormalizing() {
        let mut weights = AdaptiveWeights::uniform(["a", "b", "c"]);
        weights.update(&means(&[("a", 1.0)]), 0.5);
        // a: 0.5 * 1/3 + 0.5 * 1 = 2/3, b and c stay 1/3, then renormalize over 4/3
        assert!((weights.get("a") - 0.5).abs() < 1e-12);
        assert!((weights.get("b") - 0.25).abs() < 1e-12);
        assert!((weights.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_means_leave_weights_unchanged() {
        let mut weights = AdaptiveWeights::uniform(["a", "b"]);
        weights.update(&means(&[("a", 0.0), ("b", 0.0)]), 0.1);
        assert_eq!(weights.get("a"), 0.5);
    }

    #[test]
    fn test_align_with_backends() {
        let mut weights = AdaptiveWeights::uniform(["old", "lexical"]);
        weights.align_with(&["lexical".to_string(), "vector".to_string()]);
        assert_eq!(weights.get("old"), 0.0);
        assert!((weights.get("lexical") - 0.5).abs() < 1e-12);
        assert!((weights.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_repairs_invalid_weights() {
        let mut weights: AdaptiveWeights =
            serde_json::from_value(serde_json::json!({ "a": -1.0, "b": 0.0 })).unwrap();
        weights.normalize();
        assert_eq!(weights.get("a"), 0.5);
        assert_eq!(weights.get("b"), 0.5);
    }
}
