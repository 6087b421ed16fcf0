//! Forgetting score configuration
//!
//! A document's retention score is a weighted sum of three factors, each in
//! [0, 1]: how recently it was used, how often it was used, and how relevant
//! it was to the query that last retrieved it. The weights must sum to 1 so
//! the score stays in [0, 1].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tolerance used when checking that weights sum to 1
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weights of the three retention factors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForgettingWeights {
    /// Weight of the recency factor. Default: 0.4
    pub recency: f64,

    /// Weight of the usage factor. Default: 0.3
    pub usage: f64,

    /// Weight of the context relevance factor. Default: 0.3
    pub relevance: f64,
}

impl Default for ForgettingWeights {
    fn default() -> Self {
        Self {
            recency: 0.4,
            usage: 0.3,
            relevance: 0.3,
        }
    }
}

impl ForgettingWeights {
    /// Create a weight triple
    pub fn new(recency: f64, usage: f64, relevance: f64) -> Self {
        Self {
            recency,
            usage,
            relevance,
        }
    }

    /// Weights favouring fresh documents, for temporal queries
    pub fn recency_focused() -> Self {
        Self::new(0.6, 0.2, 0.2)
    }

    /// Weights favouring query overlap, for semantic queries
    pub fn relevance_focused() -> Self {
        Self::new(0.2, 0.2, 0.6)
    }

    /// Sum of the three weights
    pub fn sum(&self) -> f64 {
        self.recency + self.usage + self.relevance
    }

    /// Validate the weights
    ///
    /// Returns an error if any weight is negative or not finite, or if the
    /// weights do not sum to 1.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("recency", self.recency),
            ("usage", self.usage),
            ("relevance", self.relevance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} weight must be a finite value >= 0.0", name));
            }
        }
        if (self.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(format!(
                "forgetting weights must sum to 1.0 (got {:.6})",
                self.sum()
            ));
        }
        Ok(())
    }
}

/// Configuration for the forgetting scorer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForgettingConfig {
    /// Documents scoring below this are hidden. Default: 0.3
    pub threshold: f64,

    /// Default factor weights
    pub weights: ForgettingWeights,

    /// Days after which recency reaches 0. Default: 365
    pub recency_horizon_days: f64,

    /// Access count at which usage saturates at 1. Default: 10
    pub usage_saturation: u32,

    /// Share of the backend score in `combined_score`; the rest is the
    /// retention score. Default: 0.5
    pub base_blend: f64,

    /// Weight overrides keyed by query type name
    pub query_type_weights: BTreeMap<String, ForgettingWeights>,
}

impl Default for ForgettingConfig {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            weights: ForgettingWeights::default(),
            recency_horizon_days: 365.0,
            usage_saturation: 10,
            base_blend: 0.5,
            query_type_weights: BTreeMap::new(),
        }
    }
}

impl ForgettingConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err("forgetting.threshold must be within [0, 1]".to_string());
        }
        self.weights
            .validate()
            .map_err(|e| format!("forgetting.weights: {}", e))?;
        if !(self.recency_horizon_days.is_finite() && self.recency_horizon_days > 0.0) {
            return Err("forgetting.recency_horizon_days must be > 0".to_string());
        }
        if self.usage_saturation == 0 {
            return Err("forgetting.usage_saturation must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.base_blend) {
            return Err("forgetting.base_blend must be within [0, 1]".to_string());
        }
        for (query_type, weights) in &self.query_type_weights {
            if query_type.parse::<crate::selector::QueryType>().is_err() {
                return Err(format!(
                    "forgetting.query_type_weights has unknown query type '{}'",
                    query_type
                ));
            }
            weights
                .validate()
                .map_err(|e| format!("forgetting.query_type_weights['{}']: {}", query_type, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = ForgettingWeights::default();
        assert_eq!(weights.recency, 0.4);
        assert_eq!(weights.usage, 0.3);
        assert_eq!(weights.relevance, 0.3);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ForgettingWeights::recency_focused().validate().is_ok());
        assert!(ForgettingWeights::relevance_focused().validate().is_ok());
    }

    #[test]
    fn test_negative_weight_is_rejected() {
        let weights = ForgettingWeights::new(1.2, -0.2, 0.0);
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_weights_not_summing_to_one_are_rejected() {
        assert!(ForgettingWeights::new(0.4, 0.4, 0.4).validate().is_err());
        assert!(ForgettingWeights::new(0.1, 0.1, 0.1).validate().is_err());
    }

    #[test]
    fn test_nan_weight_is_rejected() {
        assert!(ForgettingWeights::new(f64::NAN, 0.5, 0.5).validate().is_err());
    }

    #[test]
    fn test_config_validation() {
        assert!(ForgettingConfig::default().validate().is_ok());

        let config = ForgettingConfig {
            recency_horizon_days: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ForgettingConfig {
            usage_saturation: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ForgettingConfig {
            base_blend: 2.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
