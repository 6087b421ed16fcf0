#[cfg(test)]
mod tests {
    use crate::config::{
        BimfuseConfig, ConfigBuilder, ConfigError, ConfigLoader, LogFormat, LogLevel, validation,
    };
    use crate::fusion::FusionStrategy;
    use crate::search::ForgettingWeights;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = BimfuseConfig::default();
        assert_eq!(config.context.window_size, 10);
        assert_eq!(config.forgetting.threshold, 0.3);
        assert_eq!(config.forgetting.weights.recency, 0.4);
        assert_eq!(config.forgetting.weights.usage, 0.3);
        assert_eq!(config.forgetting.weights.relevance, 0.3);
        assert_eq!(config.selector.exploration_rate, 0.1);
        assert_eq!(config.selector.learning_rate, 0.1);
        assert_eq!(config.selector.performance_window, 20);
        assert_eq!(config.fusion.default_strategy, FusionStrategy::Adaptive);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(validation::validate_config(&config).is_ok());
    }

    #[test]
    fn test_default_backend_map() {
        let config = BimfuseConfig::default();
        let map = &config.selector.default_backends;
        assert_eq!(map["identifier"], "contextual");
        assert_eq!(map["author"], "contextual");
        assert_eq!(map["temporal"], "contextual");
        assert_eq!(map["semantic"], "vector");
        assert_eq!(map["keyword"], "lexical");
    }

    #[test]
    fn test_builder_sets_values() {
        let config = ConfigBuilder::new()
            .with_context_window_size(4)
            .with_forgetting_threshold(0.5)
            .with_forgetting_weights(0.5, 0.25, 0.25)
            .with_exploration_rate(0.2)
            .with_primary_backend("lexical")
            .with_log_level(LogLevel::Debug)
            .build()
            .unwrap();

        assert_eq!(config.context.window_size, 4);
        assert_eq!(config.forgetting.threshold, 0.5);
        assert_eq!(config.forgetting.weights.recency, 0.5);
        assert_eq!(config.selector.exploration_rate, 0.2);
        assert_eq!(config.fusion.primary_backend.as_deref(), Some("lexical"));
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let result = ConfigBuilder::new()
            .with_forgetting_weights(0.5, 0.5, 0.5)
            .build();
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_query_type_weights_are_validated() {
        let result = ConfigBuilder::new()
            .with_query_type_weights("temporal", ForgettingWeights::new(0.9, 0.3, 0.0))
            .build();
        assert!(result.is_err());

        let result = ConfigBuilder::new()
            .with_query_type_weights("temporal", ForgettingWeights::new(0.7, 0.1, 0.2))
            .build();
        assert!(result.is_ok());

        let result = ConfigBuilder::new()
            .with_query_type_weights("nonsense", ForgettingWeights::default())
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_threshold_out_of_range_is_rejected() {
        assert!(ConfigBuilder::new().with_forgetting_threshold(-0.1).build().is_err());
        assert!(ConfigBuilder::new().with_forgetting_threshold(1.1).build().is_err());
        assert!(ConfigBuilder::new().with_forgetting_threshold(0.0).build().is_ok());
        assert!(ConfigBuilder::new().with_forgetting_threshold(1.0).build().is_ok());
    }

    #[test]
    fn test_non_positive_windows_are_rejected() {
        assert!(ConfigBuilder::new().with_context_window_size(0).build().is_err());
        assert!(ConfigBuilder::new().with_performance_window(0).build().is_err());
        assert!(ConfigBuilder::new().with_backend_timeout_ms(0).build().is_err());
    }

    #[test]
    fn test_unknown_default_backend_query_type_is_rejected() {
        let result = ConfigBuilder::new()
            .with_default_backend("spatial", "vector")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_presets_are_valid() {
        let dev = ConfigBuilder::development().build().unwrap();
        assert_eq!(dev.logging.format, LogFormat::Pretty);

        let testing = ConfigBuilder::testing().build().unwrap();
        assert_eq!(testing.selector.seed, Some(7));

        let prod = ConfigBuilder::production().build().unwrap();
        assert_eq!(prod.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_loader_reads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bimfuse.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[context]
window_size = 6

[forgetting]
threshold = 0.25

[fusion]
default_strategy = "weighted"
primary_backend = "vector"
"#
        )
        .unwrap();

        let config = ConfigLoader::new().load_file(&path).unwrap().extract().unwrap();
        assert_eq!(config.context.window_size, 6);
        assert_eq!(config.forgetting.threshold, 0.25);
        assert_eq!(config.fusion.default_strategy, FusionStrategy::Weighted);
        assert_eq!(config.fusion.primary_backend.as_deref(), Some("vector"));
        // untouched sections keep their defaults
        assert_eq!(config.selector.performance_window, 20);
    }

    #[test]
    fn test_loader_rejects_invalid_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bimfuse.json");
        std::fs::write(
            &path,
            r#"{ "forgetting": { "weights": { "recency": 0.9, "usage": 0.9, "relevance": 0.9 } } }"#,
        )
        .unwrap();

        let result = ConfigLoader::new().load_file(&path).unwrap().extract();
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_loader_missing_and_unsupported_files() {
        let mut loader = ConfigLoader::new();
        assert!(matches!(
            loader.load_file("/definitely/not/here.toml"),
            Err(ConfigError::FileLoadError(_))
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bimfuse.ini");
        std::fs::write(&path, "x=1").unwrap();
        assert!(matches!(
            loader.load_file(&path),
            Err(ConfigError::FileLoadError(_))
        ));

        // The loader is still usable after a failed load
        assert!(loader.extract().is_ok());
    }

    #[test]
    fn test_unknown_strategy_in_file_fails_to_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bimfuse.toml");
        std::fs::write(&path, "[fusion]\ndefault_strategy = \"magic\"\n").unwrap();

        let result = ConfigLoader::new().load_file(&path).unwrap().extract();
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
