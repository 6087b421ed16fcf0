//! Configuration validation utilities.
//!
//! This module provides validation functions for configuration values.

use super::ConfigError;
use super::models::*;

/// Validate the entire configuration.
pub fn validate_config(config: &BimfuseConfig) -> Result<(), ConfigError> {
    config
        .context
        .validate()
        .map_err(ConfigError::ValidationError)?;
    config
        .forgetting
        .validate()
        .map_err(ConfigError::ValidationError)?;
    config
        .selector
        .validate()
        .map_err(ConfigError::ValidationError)?;
    config
        .fusion
        .validate()
        .map_err(ConfigError::ValidationError)?;

    validate_default_backends(&config.selector)?;

    Ok(())
}

/// Every default backend entry must name a known query type and a backend.
fn validate_default_backends(config: &SelectorConfig) -> Result<(), ConfigError> {
    for (query_type, backend) in &config.default_backends {
        if query_type.parse::<crate::selector::QueryType>().is_err() {
            return Err(ConfigError::ValidationError(format!(
                "selector.default_backends has unknown query type '{}'",
                query_type
            )));
        }
        if backend.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "selector.default_backends['{}'] cannot be empty",
                query_type
            )));
        }
    }
    Ok(())
}
