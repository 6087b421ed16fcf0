//! Configuration model definitions.
//!
//! This module contains the configuration structures for all bimfuse components.

use crate::fusion::FusionStrategy;
use crate::search::ForgettingConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Main configuration structure for bimfuse.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct BimfuseConfig {
    /// Context tracking configuration
    pub context: ContextConfig,

    /// Forgetting scorer configuration
    pub forgetting: ForgettingConfig,

    /// Adaptive backend selection configuration
    pub selector: SelectorConfig,

    /// Fusion engine configuration
    pub fusion: FusionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Configuration for the context tracker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContextConfig {
    /// Number of recent queries kept in the context window
    pub window_size: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self { window_size: 10 }
    }
}

impl ContextConfig {
    /// Validate the configuration, returning an error if invalid
    pub fn validate(&self) -> Result<(), String> {
        if self.window_size == 0 {
            return Err("context.window_size must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Configuration for the adaptive selector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectorConfig {
    /// Probability of trying a non-default backend while exploring
    pub exploration_rate: f64,

    /// Smoothing factor for adaptive weight updates
    pub learning_rate: f64,

    /// Maximum samples kept per query type and per backend
    pub performance_window: usize,

    /// Samples needed before a query type leaves the collecting state
    pub min_samples: usize,

    /// Mean performance at or above which a query type is stable
    pub stability_threshold: f64,

    /// Recent samples a backend needs before its weight is updated
    pub weight_update_samples: usize,

    /// Seed for the exploration RNG; entropy-seeded when absent
    pub seed: Option<u64>,

    /// Default backend per query type
    pub default_backends: BTreeMap<String, String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        let default_backends = [
            ("identifier", "contextual"),
            ("author", "contextual"),
            ("temporal", "contextual"),
            ("semantic", "vector"),
            ("keyword", "lexical"),
        ]
        .into_iter()
        .map(|(query_type, backend)| (query_type.to_string(), backend.to_string()))
        .collect();

        Self {
            exploration_rate: 0.1,
            learning_rate: 0.1,
            performance_window: 20,
            min_samples: 5,
            stability_threshold: 0.5,
            weight_update_samples: 3,
            seed: None,
            default_backends,
        }
    }
}

impl SelectorConfig {
    /// Validate the configuration, returning an error if invalid
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.exploration_rate) {
            return Err("selector.exploration_rate must be within [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.learning_rate) {
            return Err("selector.learning_rate must be within [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.stability_threshold) {
            return Err("selector.stability_threshold must be within [0, 1]".to_string());
        }
        if self.performance_window == 0 {
            return Err("selector.performance_window must be greater than 0".to_string());
        }
        if self.min_samples == 0 {
            return Err("selector.min_samples must be greater than 0".to_string());
        }
        if self.weight_update_samples == 0 {
            return Err("selector.weight_update_samples must be greater than 0".to_string());
        }
        if self.min_samples > self.performance_window {
            return Err(
                "selector.min_samples cannot exceed selector.performance_window".to_string(),
            );
        }
        if self.weight_update_samples > self.performance_window {
            return Err(
                "selector.weight_update_samples cannot exceed selector.performance_window"
                    .to_string(),
            );
        }
        Ok(())
    }
}

/// Configuration for the fusion engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FusionConfig {
    /// Strategy used by `FusionEngine::query`
    pub default_strategy: FusionStrategy,

    /// Backend used by the basic strategy; first registered backend when absent
    pub primary_backend: Option<String>,

    /// Upper bound for a single backend call, in milliseconds
    pub backend_timeout_ms: u64,

    /// Whether retrieved candidates go through the forgetting filter
    pub forgetting_enabled: bool,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            default_strategy: FusionStrategy::Adaptive,
            primary_backend: None,
            backend_timeout_ms: 10_000,
            forgetting_enabled: true,
        }
    }
}

impl FusionConfig {
    /// Validate the configuration, returning an error if invalid
    pub fn validate(&self) -> Result<(), String> {
        if self.backend_timeout_ms == 0 {
            return Err("fusion.backend_timeout_ms must be greater than 0".to_string());
        }
        if let Some(primary) = &self.primary_backend
            && primary.trim().is_empty()
        {
            return Err("fusion.primary_backend cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,

    /// Log format
    pub format: LogFormat,

    /// File to log to (if any)
    pub file: Option<PathBuf>,

    /// Whether to log to stdout
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Default,
            file: None,
            stdout: true,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level
    Trace,

    /// Debug level
    Debug,

    /// Info level
    Info,

    /// Warn level
    Warn,

    /// Error level
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Default format
    Default,

    /// JSON format
    Json,

    /// Compact format
    Compact,

    /// Pretty format
    Pretty,
}
