//! Domain models for documents, usage, query context and result envelopes

pub mod context;
pub mod document;
pub mod result;
pub mod usage;

pub use context::{ContextVector, QueryContext};
pub use document::{Document, DocumentKind};
pub use result::{
    BackendResponse, ContextualQueryResponse, Details, QueryResponse, RetrievalResult,
    ScoreBreakdown,
};
pub use usage::DocumentUsage;
