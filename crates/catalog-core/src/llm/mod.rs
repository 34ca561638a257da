//! LLM integration
//!
//! Provides traits and implementations for:
//! - Chat completions with tool calling via external services (Groq, vLLM, OpenAI, etc.)
//! - Embedding generation via OpenAI-compatible endpoints (Ollama by default)
//! - Bounded retry around per-record calls

mod client;
mod http_embedder;
mod retry;
mod tools;
mod traits;

pub use client::{ChatMessage, HttpLLMClient, LLMClient};
pub use http_embedder::HttpEmbedder;
pub use retry::RetryPolicy;
pub use tools::{FunctionCall, ToolCall, ToolChoice, ToolDefinition};
pub use traits::*;
