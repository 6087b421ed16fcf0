//! Multi-strategy fusion of backend results
//!
//! [`FusionEngine`] is the entry point. It calls backends according to a
//! [`FusionStrategy`], runs the candidates through the forgetting scorer and
//! keeps the context window, usage records and selector up to date.

pub mod engine;
pub mod strategy;

pub use engine::{FusionEngine, FusionEngineBuilder};
pub use strategy::FusionStrategy;
