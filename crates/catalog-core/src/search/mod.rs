//! Search engine module
//!
//! Provides vector similarity search over the store.

mod vector;

pub use vector::search;

use serde::Serialize;

/// Search options
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Maximum number of results
    pub limit: usize,
    /// Minimum score threshold (-1.0 - 1.0)
    pub min_score: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 5,
            min_score: 0.0,
        }
    }
}

/// Search result
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub doc_id: String,
    pub score: f64,
    /// `name:` line of the block, if any
    pub name: Option<String>,
    pub content: String,
}
