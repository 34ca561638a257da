//! Catalog Core Library
//!
//! Core functionality for enriching audio-product catalogues with an LLM and
//! loading them into a local vector store for retrieval.
//!
//! # Features
//! - CSV and JSON enrichment through a forced `enrich_product` tool call
//! - Free-form file operations with tools offered in auto mode
//! - Embedding corpus builder with `---`-separated blocks
//! - SQLite vector store with cosine-similarity search

pub mod assist;
pub mod config;
pub mod corpus;
pub mod db;
pub mod enrich;
pub mod error;
pub mod index;
pub mod llm;
pub mod search;
pub mod taxonomy;

pub use assist::{run_assist, AssistOutcome, FileOps};
pub use config::{Config, EmbeddingServiceConfig, LLMServiceConfig, RetryConfig};
pub use corpus::{build_corpus, split_blocks, to_embedding_block, Document, ProductRow};
pub use db::{StoreStats, VectorStore};
pub use enrich::{enrich_csv, enrich_json, EnrichOptions, EnrichProgress, EnrichReport, RecordOutcome};
pub use error::{CatalogError, Error, Result};
pub use index::{ingest_documents, IngestProgress, IngestStats};
pub use llm::{
    ChatMessage, Embedder, HttpEmbedder, HttpLLMClient, LLMClient, RetryPolicy, ToolCall,
    ToolChoice, ToolDefinition,
};
pub use search::{search, SearchHit, SearchOptions};
pub use taxonomy::{Connectivity, ProductType, UseCase, ValueOrder};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "catalog";
