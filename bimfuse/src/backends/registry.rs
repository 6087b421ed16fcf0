//! Backend registry with timeout-bounded invocation
//!
//! The registry owns the registered backends and runs queries against them:
//! - one backend at a time ([`BackendRegistry::invoke`])
//! - every backend concurrently ([`BackendRegistry::fan_out`])
//!
//! Each call is bounded by the registry timeout. Failures, timeouts and
//! malformed envelopes are captured in the [`BackendOutcome`] instead of
//! being returned as errors, so one bad backend never aborts a fan-out.

use crate::models::BackendResponse;
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::error::BackendError;
use super::traits::RetrievalBackend;

/// Result of calling one backend
#[derive(Debug, Clone)]
pub struct BackendOutcome {
    /// Backend name
    pub backend: String,
    /// Envelope, or why there is none
    pub result: Result<BackendResponse, BackendError>,
    /// Wall clock time spent waiting for the backend
    pub elapsed: Duration,
}

impl BackendOutcome {
    /// Whether the backend produced a valid envelope
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// The envelope, or a zero-confidence sentinel explaining the failure
    pub fn response(&self) -> BackendResponse {
        match &self.result {
            Ok(response) => response.clone(),
            Err(e) => BackendResponse::empty(&self.backend, e.to_string()),
        }
    }

    /// Confidence of the envelope, 0 on failure
    pub fn confidence(&self) -> f64 {
        self.result.as_ref().map_or(0.0, |response| response.confidence)
    }

    /// Reported result count, 0 on failure
    pub fn result_count(&self) -> usize {
        self.result.as_ref().map_or(0, |response| response.result_count)
    }

    /// The error message, if the call failed
    pub fn error(&self) -> Option<String> {
        self.result.as_ref().err().map(ToString::to_string)
    }
}

/// Registered backends in registration order
#[derive(Debug, Clone)]
pub struct BackendRegistry {
    backends: Vec<Arc<dyn RetrievalBackend>>,
    timeout: Duration,
}

impl BackendRegistry {
    /// Create an empty registry with a per-call timeout
    pub fn new(timeout: Duration) -> Self {
        Self {
            backends: Vec::new(),
            timeout,
        }
    }

    /// Per-call timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Register a backend, replacing any backend with the same name
    pub fn register(&mut self, backend: Arc<dyn RetrievalBackend>) {
        let name = backend.name().to_string();
        if let Some(existing) = self.backends.iter_mut().find(|b| b.name() == name) {
            warn!(backend = %name, "Replacing already registered backend");
            *existing = backend;
        } else {
            self.backends.push(backend);
            debug!(backend = %name, "Backend registered");
        }
    }

    /// Names of the registered backends, in registration order
    pub fn names(&self) -> Vec<String> {
        self.backends.iter().map(|b| b.name().to_string()).collect()
    }

    /// Whether a backend is registered
    pub fn contains(&self, name: &str) -> bool {
        self.backends.iter().any(|b| b.name() == name)
    }

    /// Number of registered backends
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Whether no backend is registered
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Call a single backend by name
    ///
    /// # Arguments
    /// * `name` - Registered backend name
    /// * `text` - Query text
    ///
    /// # Returns
    /// The outcome; an unknown name yields [`BackendError::NotRegistered`]
    pub async fn invoke(&self, name: &str, text: &str) -> BackendOutcome {
        match self.backends.iter().find(|b| b.name() == name) {
            Some(backend) => self.call(backend.as_ref(), text).await,
            None => BackendOutcome {
                backend: name.to_string(),
                result: Err(BackendError::NotRegistered(name.to_string())),
                elapsed: Duration::ZERO,
            },
        }
    }

    /// Call every registered backend concurrently
    ///
    /// Outcomes are returned in registration order once every backend has
    /// answered or timed out.
    pub async fn fan_out(&self, text: &str) -> Vec<BackendOutcome> {
        join_all(
            self.backends
                .iter()
                .map(|backend| self.call(backend.as_ref(), text)),
        )
        .await
    }

    async fn call(&self, backend: &dyn RetrievalBackend, text: &str) -> BackendOutcome {
        let name = backend.name().to_string();
        let started = Instant::now();

        let result = match tokio::time::timeout(self.timeout, backend.query(text)).await {
            Ok(Ok(response)) => validate_response(&name, response),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(BackendError::Timeout {
                backend: name.clone(),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        };
        let elapsed = started.elapsed();

        match &result {
            Ok(response) => debug!(
                backend = %name,
                confidence = response.confidence,
                result_count = response.result_count,
                elapsed_ms = elapsed.as_millis() as u64,
                "Backend answered"
            ),
            Err(e) => warn!(
                backend = %name,
                elapsed_ms = elapsed.as_millis() as u64,
                "Backend call failed: {}",
                e
            ),
        }

        BackendOutcome {
            backend: name,
            result,
            elapsed,
        }
    }
}

/// Check an envelope against the contract and stamp its source
fn validate_response(
    name: &str,
    mut response: BackendResponse,
) -> Result<BackendResponse, BackendError> {
    if !response.confidence.is_finite() || !(0.0..=1.0).contains(&response.confidence) {
        return Err(BackendError::Malformed {
            backend: name.to_string(),
            message: format!("confidence {} is outside [0, 1]", response.confidence),
        });
    }
    if response.source.is_empty() {
        response.source = name.to_string();
    }
    if response.result_count < response.entities.len() {
        response.result_count = response.entities.len();
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::StaticBackend;

    fn registry() -> BackendRegistry {
        let mut registry = BackendRegistry::new(Duration::from_millis(50));
        registry.register(Arc::new(StaticBackend::new(
            "lexical",
            BackendResponse::new("", "wall W-12", 0.8).with_entities(["w12"]),
        )));
        registry.register(Arc::new(StaticBackend::failing("vector", "index offline")));
        registry.register(Arc::new(
            StaticBackend::new("slow", BackendResponse::new("slow", "late", 0.9))
                .with_delay(Duration::from_secs(5)),
        ));
        registry
    }

    #[tokio::test]
    async fn test_invoke_stamps_source() {
        let outcome = registry().invoke("lexical", "wall").await;
        let response = outcome.result.unwrap();
        assert_eq!(response.source, "lexical");
        assert_eq!(response.result_count, 1);
    }

    #[tokio::test]
    async fn test_invoke_unknown_backend() {
        let outcome = registry().invoke("graph", "wall").await;
        assert_eq!(outcome.confidence(), 0.0);
        assert_eq!(
            outcome.result.as_ref().unwrap_err(),
            &BackendError::NotRegistered("graph".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fan_out_isolates_failures_and_timeouts() {
        let outcomes = registry().fan_out("wall").await;
        assert_eq!(outcomes.len(), 3);

        assert!(outcomes[0].is_ok());
        assert!(matches!(outcomes[1].result, Err(BackendError::Failed { .. })));
        assert!(matches!(
            outcomes[2].result,
            Err(BackendError::Timeout { timeout_ms: 50, .. })
        ));

        let sentinel = outcomes[2].response();
        assert_eq!(sentinel.confidence, 0.0);
        assert!(sentinel.answer.contains("timed out"));
    }

    #[tokio::test]
    async fn test_malformed_confidence_is_rejected() {
        let mut registry = BackendRegistry::new(Duration::from_secs(1));
        registry.register(Arc::new(StaticBackend::new(
            "broken",
            BackendResponse::new("broken", "?", f64::NAN),
        )));
        registry.register(Arc::new(StaticBackend::new(
            "overconfident",
            BackendResponse::new("overconfident", "!", 1.5),
        )));

        for outcome in registry.fan_out("anything").await {
            assert!(matches!(outcome.result, Err(BackendError::Malformed { .. })));
        }
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = registry();
        registry.register(Arc::new(StaticBackend::new(
            "vector",
            BackendResponse::new("vector", "ok", 0.5),
        )));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names(), vec!["lexical", "vector", "slow"]);
    }
}
