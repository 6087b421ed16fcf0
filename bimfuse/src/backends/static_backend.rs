//! A backend that replays a fixed answer.
//!
//! Useful for wiring up an engine without real indices, and for tests.

use crate::models::BackendResponse;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::error::BackendError;
use super::traits::RetrievalBackend;

/// Backend answering every query with the same response (or failure)
#[derive(Debug, Clone)]
pub struct StaticBackend {
    name: String,
    response: Result<BackendResponse, String>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl StaticBackend {
    /// Always answer with `response`
    pub fn new(name: impl Into<String>, response: BackendResponse) -> Self {
        Self {
            name: name.into(),
            response: Ok(response),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always fail with `message`
    pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            response: Err(message.into()),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of queries received so far (shared between clones)
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RetrievalBackend for StaticBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(&self, _text: &str) -> Result<BackendResponse, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.response {
            Ok(response) => Ok(response.clone()),
            Err(message) => Err(BackendError::failed(&self.name, message.clone())),
        }
    }
}
