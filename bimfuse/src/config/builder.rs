//! Configuration builder.
//!
//! This module provides a builder pattern API for creating configurations.

use super::{Result, models::*, validation};
use crate::fusion::FusionStrategy;
use crate::search::ForgettingWeights;
use std::path::Path;

/// Builder for creating BimfuseConfig instances.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: BimfuseConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: BimfuseConfig::default(),
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: BimfuseConfig) -> Self {
        Self { config }
    }

    /// Set the number of recent queries kept for context.
    pub fn with_context_window_size(mut self, window_size: usize) -> Self {
        self.config.context.window_size = window_size;
        self
    }

    /// Set the forgetting threshold below which documents are hidden.
    pub fn with_forgetting_threshold(mut self, threshold: f64) -> Self {
        self.config.forgetting.threshold = threshold;
        self
    }

    /// Set the recency/usage/relevance weights (must sum to 1).
    pub fn with_forgetting_weights(mut self, recency: f64, usage: f64, relevance: f64) -> Self {
        self.config.forgetting.weights = ForgettingWeights::new(recency, usage, relevance);
        self
    }

    /// Override the forgetting weights for one query type.
    pub fn with_query_type_weights(
        mut self,
        query_type: impl Into<String>,
        weights: ForgettingWeights,
    ) -> Self {
        self.config
            .forgetting
            .query_type_weights
            .insert(query_type.into(), weights);
        self
    }

    /// Set the exploration probability used while a query type is underperforming.
    pub fn with_exploration_rate(mut self, rate: f64) -> Self {
        self.config.selector.exploration_rate = rate;
        self
    }

    /// Set the adaptive weight learning rate.
    pub fn with_learning_rate(mut self, rate: f64) -> Self {
        self.config.selector.learning_rate = rate;
        self
    }

    /// Set the number of performance samples kept per key.
    pub fn with_performance_window(mut self, window: usize) -> Self {
        self.config.selector.performance_window = window;
        self
    }

    /// Seed the exploration RNG for reproducible selection.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.selector.seed = Some(seed);
        self
    }

    /// Map a query type to its default backend.
    pub fn with_default_backend(
        mut self,
        query_type: impl Into<String>,
        backend: impl Into<String>,
    ) -> Self {
        self.config
            .selector
            .default_backends
            .insert(query_type.into(), backend.into());
        self
    }

    /// Set the strategy used when none is given explicitly.
    pub fn with_default_strategy(mut self, strategy: FusionStrategy) -> Self {
        self.config.fusion.default_strategy = strategy;
        self
    }

    /// Set the backend used by the basic strategy.
    pub fn with_primary_backend(mut self, backend: impl Into<String>) -> Self {
        self.config.fusion.primary_backend = Some(backend.into());
        self
    }

    /// Set the per-backend call timeout.
    pub fn with_backend_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.fusion.backend_timeout_ms = timeout_ms;
        self
    }

    /// Turn the forgetting filter off (results are still scored).
    pub fn without_forgetting(mut self) -> Self {
        self.config.fusion.forgetting_enabled = false;
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set the log format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Log to a file instead of stdout.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self.config.logging.stdout = false;
        self
    }

    /// Create a development configuration (debug logs, pretty output).
    pub fn development() -> Self {
        Self::new()
            .with_log_level(LogLevel::Debug)
            .with_log_format(LogFormat::Pretty)
    }

    /// Create a testing configuration (quiet logs, fixed seed, short timeouts).
    pub fn testing() -> Self {
        Self::new()
            .with_log_level(LogLevel::Warn)
            .with_seed(7)
            .with_backend_timeout_ms(1_000)
    }

    /// Create a production configuration (JSON logs).
    pub fn production() -> Self {
        Self::new()
            .with_log_level(LogLevel::Info)
            .with_log_format(LogFormat::Json)
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<BimfuseConfig> {
        validation::validate_config(&self.config)?;
        Ok(self.config)
    }
}
