//! Configuration management

use crate::error::{CatalogError, Result};
use crate::llm::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Chat completion service used for classification and file assistance
    #[serde(default)]
    pub llm: LLMServiceConfig,

    /// Embedding service used to populate the vector store
    #[serde(default)]
    pub embedding: EmbeddingServiceConfig,

    /// Per-record retry behaviour
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Chat completion service configuration (OpenAI-compatible, Groq by default)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the service; `/v1/chat/completions` is appended
    #[serde(default = "default_llm_url")]
    pub url: String,

    /// Model name for chat completions
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// API key sent as a bearer token
    #[serde(default = "default_llm_api_key")]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl LLMServiceConfig {
    /// Return the API key or fail before any work starts
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                CatalogError::Config(
                    "No chat API key configured. Set CATALOG_LLM_API_KEY or GROQ_API_KEY \
                     (a .env file is read), or llm.api_key in the config file"
                        .to_string(),
                )
            })
    }
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: default_llm_url(),
            model: default_chat_model(),
            api_key: default_llm_api_key(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Embedding service configuration (OpenAI-compatible, Ollama by default)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingServiceConfig {
    /// Base URL of the service; `/v1/embeddings` is appended
    #[serde(default = "default_embedding_url")]
    pub url: String,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Optional API key (local Ollama needs none)
    #[serde(default = "default_embedding_api_key")]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingServiceConfig {
    fn default() -> Self {
        Self {
            url: default_embedding_url(),
            model: default_embedding_model(),
            api_key: default_embedding_api_key(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

/// Retry configuration for per-record LLM calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.delay_ms))
    }
}

fn default_llm_url() -> String {
    std::env::var("CATALOG_LLM_URL").unwrap_or_else(|_| "https://api.groq.com/openai".to_string())
}

fn default_chat_model() -> String {
    std::env::var("CATALOG_LLM_MODEL").unwrap_or_else(|_| "llama3-70b-8192".to_string())
}

fn default_llm_api_key() -> Option<String> {
    std::env::var("CATALOG_LLM_API_KEY")
        .or_else(|_| std::env::var("GROQ_API_KEY"))
        .ok()
}

fn default_embedding_url() -> String {
    std::env::var("CATALOG_EMBEDDING_URL").unwrap_or_else(|_| "http://localhost:11434".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("CATALOG_EMBEDDING_MODEL").unwrap_or_else(|_| "mistral".to_string())
}

fn default_embedding_api_key() -> Option<String> {
    std::env::var("CATALOG_EMBEDDING_API_KEY").ok()
}

fn default_timeout() -> u64 {
    30
}

fn default_embedding_timeout() -> u64 {
    120
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    2000
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from an explicit path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            tracing::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
llm:
  model: llama-3.1-8b-instant
  api_key: test-key
retry:
  delay_ms: 10
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.llm.require_api_key().unwrap(), "test-key");
        assert_eq!(config.llm.timeout_secs, 30);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay_ms, 10);
    }

    #[test]
    fn test_blank_api_key_rejected() {
        let config = LLMServiceConfig {
            api_key: Some("  ".to_string()),
            ..LLMServiceConfig::default()
        };
        assert!(matches!(
            config.require_api_key(),
            Err(CatalogError::Config(_))
        ));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yml");

        let mut config = Config::default();
        config.embedding.model = "nomic-embed-text".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.embedding.model, "nomic-embed-text");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.yml")).unwrap();
        assert_eq!(config.retry.max_attempts, 3);
    }
}
