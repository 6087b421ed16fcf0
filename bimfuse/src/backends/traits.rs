//! The retrieval backend contract.
//!
//! Every pluggable backend (lexical index, vector index, graph-aware lookup)
//! answers a text query with a [`BackendResponse`]. The fusion engine never
//! looks past that envelope.
//!
//! # Examples
//!
//! ```no_run
//! use async_trait::async_trait;
//! use bimfuse::backends::{BackendError, RetrievalBackend};
//! use bimfuse::models::BackendResponse;
//!
//! #[derive(Debug)]
//! struct TitleIndex;
//!
//! #[async_trait]
//! impl RetrievalBackend for TitleIndex {
//!     fn name(&self) -> &str {
//!         "lexical"
//!     }
//!
//!     async fn query(&self, text: &str) -> Result<BackendResponse, BackendError> {
//!         Ok(BackendResponse::new("lexical", format!("No title matches '{}'", text), 0.0))
//!     }
//! }
//! ```

use crate::models::BackendResponse;
use async_trait::async_trait;

use super::error::BackendError;

/// A retrieval backend.
///
/// Backends are read-only over their own indices, so the engine may call
/// several of them concurrently for one query.
#[async_trait]
pub trait RetrievalBackend: Send + Sync + std::fmt::Debug {
    /// Unique name used for registration, default maps and weights
    fn name(&self) -> &str;

    /// Answer a query
    ///
    /// # Arguments
    /// * `text` - The raw query text
    ///
    /// # Returns
    /// The backend envelope, or an error the engine will downgrade to a
    /// zero-confidence result
    async fn query(&self, text: &str) -> Result<BackendResponse, BackendError>;
}
