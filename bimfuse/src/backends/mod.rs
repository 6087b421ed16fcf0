//! Pluggable retrieval backends
//!
//! Backends implement [`RetrievalBackend`] and are registered with a
//! [`BackendRegistry`], which bounds each call by a timeout and turns every
//! failure into a [`BackendOutcome`] carrying a [`BackendError`].

pub mod error;
pub mod registry;
pub mod static_backend;
pub mod traits;

pub use error::BackendError;
pub use registry::{BackendOutcome, BackendRegistry};
pub use static_backend::StaticBackend;
pub use traits::RetrievalBackend;
