//! Indexing pipeline
//!
//! Loads corpus documents into the vector store.

mod embedder;

#[cfg(test)]
pub(crate) use embedder::test_utils;
pub use embedder::*;
