//! nexuslearn-providers: LLM provider integrations.
//!
//! Implements the `LlmProvider` trait for Anthropic, OpenAI and Ollama, and
//! loads the `nexuslearn.toml` configuration that selects between them.

pub mod anthropic;
pub mod config;
pub mod error;
pub mod mock;
pub mod ollama;
pub mod openai;

pub use config::{create_provider, load_config, NexusConfig, ProviderConfig};
pub use error::ProviderError;
