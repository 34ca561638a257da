//! Vector store layer
//!
//! SQLite-based storage with:
//! - Content-addressable corpus documents (SHA-256)
//! - f32 embedding BLOBs per document and model
//! - Model dimension tracking

mod content;
mod documents;
mod schema;
mod stats;
pub mod vectors;

pub use content::{hash_content, short_id};
pub use schema::{VectorStore, STORE_FILE_NAME};
pub use stats::{ModelInfo, StoreStats};
pub use vectors::cosine_similarity;

/// Default store directory, relative to the working directory
pub const DEFAULT_STORE_DIR: &str = "vector_store";
