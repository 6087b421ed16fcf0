//! Errors raised by retrieval backends

use thiserror::Error;

/// A backend call that produced nothing usable.
///
/// The fusion engine never propagates these; each one becomes a
/// zero-confidence outcome for the query that triggered it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The backend reported a failure
    #[error("Backend '{backend}' failed: {message}")]
    Failed { backend: String, message: String },

    /// The backend did not answer within the configured timeout
    #[error("Backend '{backend}' timed out after {timeout_ms}ms")]
    Timeout { backend: String, timeout_ms: u64 },

    /// The backend answered with data outside the contract
    #[error("Backend '{backend}' returned malformed data: {message}")]
    Malformed { backend: String, message: String },

    /// No backend with this name is registered
    #[error("Backend '{0}' is not registered")]
    NotRegistered(String),
}

impl BackendError {
    /// Convenience constructor for [`BackendError::Failed`]
    pub fn failed(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Name of the backend involved
    pub fn backend(&self) -> &str {
        match self {
            Self::Failed { backend, .. }
            | Self::Timeout { backend, .. }
            | Self::Malformed { backend, .. } => backend,
            Self::NotRegistered(backend) => backend,
        }
    }
}
