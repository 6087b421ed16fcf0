//! Adaptive backend selection
//!
//! Classifies each query, picks the backend expected to answer it best and
//! learns from observed outcomes:
//!
//! - [`classify`] maps a query string to a [`QueryType`]
//! - [`PerformanceHistory`] keeps bounded score histories per type and per backend
//! - [`AdaptiveWeights`] is a normalized weight distribution over backends
//! - [`AdaptiveSelector`] ties them together with epsilon-greedy exploration

pub mod adaptive;
pub mod classifier;
pub mod performance;
pub mod weights;

pub use adaptive::{
    AdaptiveSelector, BackendSummary, PerformanceSummary, QueryTypeSummary, Selection,
    SelectionState,
};
pub use classifier::{QueryType, classify};
pub use performance::{PerformanceHistory, PerformanceSample, performance_score};
pub use weights::AdaptiveWeights;
