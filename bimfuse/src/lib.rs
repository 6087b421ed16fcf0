//! # bimfuse
//!
//! Retrieval decision layer for building-model knowledge graphs. Several
//! interchangeable retrieval backends (lexical index, vector index,
//! graph-aware lookup) answer the same query; bimfuse decides which of them
//! to trust and which retrieved documents are still worth showing.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bimfuse::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ConfigBuilder::development().build()?;
//!
//!     let engine = FusionEngine::builder()
//!         .config(config)
//!         .backend(Arc::new(StaticBackend::new(
//!             "lexical",
//!             BackendResponse::new("lexical", "Wall W-01", 0.8)
//!                 .with_entities(["2O2Fr$t4X7Zf8NOew3FLOH"]),
//!         )))
//!         .build()?;
//!
//!     let response = engine.execute("exterior walls", FusionStrategy::Adaptive).await;
//!     println!("{} ({} results)", response.answer, response.result_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **storage**: per-document usage records, document lookup, state snapshots
//! - **context**: bounded window of recent queries and a relevance signal
//! - **search**: forgetting scorer combining recency, usage and relevance
//! - **selector**: query classification and epsilon-greedy backend selection
//! - **backends**: the backend contract and a timeout-bounded registry
//! - **fusion**: the engine tying it all together

pub mod backends;
pub mod config;
pub mod context;
pub mod fusion;
pub mod logging;
pub mod models;
pub mod search;
pub mod selector;
pub mod storage;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::init;

    pub use crate::config::{BimfuseConfig, ConfigBuilder, ConfigLoader, LogFormat, LogLevel};

    pub use crate::backends::{BackendError, RetrievalBackend, StaticBackend};

    pub use crate::fusion::{FusionEngine, FusionEngineBuilder, FusionStrategy};

    pub use crate::models::{
        BackendResponse, ContextualQueryResponse, Document, DocumentKind, QueryResponse,
        RetrievalResult,
    };

    pub use crate::selector::{QueryType, SelectionState};

    pub use crate::storage::{DocumentSource, InMemoryDocumentSource, LoadOutcome};

    pub use crate::{BimfuseError, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for bimfuse operations
#[derive(Debug, thiserror::Error)]
pub enum BimfuseError {
    /// Invalid configuration; raised at construction time
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A snapshot is unreadable or does not match the supported schema
    #[error("State corruption: {0}")]
    StateCorruption(String),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] logging::LogError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<config::ConfigError> for BimfuseError {
    fn from(err: config::ConfigError) -> Self {
        BimfuseError::Configuration(err.to_string())
    }
}

impl From<storage::SnapshotError> for BimfuseError {
    fn from(err: storage::SnapshotError) -> Self {
        match err {
            storage::SnapshotError::Io(e) => BimfuseError::Io(e),
            storage::SnapshotError::Parse(msg) => BimfuseError::Serialization(msg),
            other => BimfuseError::StateCorruption(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for BimfuseError {
    fn from(err: serde_json::Error) -> Self {
        BimfuseError::Serialization(err.to_string())
    }
}

/// Result type for bimfuse operations
pub type Result<T> = std::result::Result<T, BimfuseError>;

/// Initialize logging and build an engine over the given backends
///
/// # Arguments
/// * `config` - Validated configuration
/// * `backends` - Backends to register, in fallback order
///
/// # Returns
/// The engine together with the logging guard, which must be kept alive for
/// file logging to be flushed
///
/// # Examples
///
/// ```no_run
/// use bimfuse::prelude::*;
/// use std::sync::Arc;
///
/// async fn example() -> Result<()> {
///     let config = ConfigBuilder::production().build()?;
///     let backend: Arc<dyn RetrievalBackend> =
///         Arc::new(StaticBackend::new("lexical", BackendResponse::empty("lexical", "nothing")));
///     let (engine, _guard) = init(config, vec![backend])?;
///     engine.query("recent clashes").await;
///     Ok(())
/// }
/// ```
pub fn init(
    config: config::BimfuseConfig,
    backends: Vec<std::sync::Arc<dyn backends::RetrievalBackend>>,
) -> Result<(fusion::FusionEngine, logging::LogGuard)> {
    let guard = logging::init(&config.logging)?;

    let engine = backends
        .into_iter()
        .fold(fusion::FusionEngine::builder().config(config), |builder, backend| {
            builder.backend(backend)
        })
        .build()?;

    tracing::info!(
        version = VERSION,
        backends = ?engine.backend_names(),
        "bimfuse initialized"
    );
    Ok((engine, guard))
}
