//! Query context tracking
//!
//! Keeps a bounded window of recent queries with the documents they
//! retrieved, and derives a lightweight relevance signal per document.

pub mod tokenizer;
pub mod tracker;

pub use tokenizer::{token_set, tokenize};
pub use tracker::{ContextTracker, ContextUpdate};
