//! State storage
//!
//! - [`UsageStore`]: per-document usage records, owned by the forgetting scorer
//! - [`DocumentSource`]: read-only lookup of the documents behind retrieved ids
//! - [`StateSnapshot`]: versioned on-disk snapshot of all learned state

pub mod document_source;
pub mod snapshot;
pub mod usage_store;

pub use document_source::{DocumentSource, InMemoryDocumentSource};
pub use snapshot::{LoadOutcome, SNAPSHOT_VERSION, SnapshotError, StateSnapshot, migrate};
pub use usage_store::UsageStore;
