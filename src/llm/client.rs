//! LLM client abstraction.
//!
//! The answering pipeline only needs one-shot completions, so the trait is
//! small. [`OllamaClient`](crate::llm::ollama::OllamaClient) is the only
//! production implementation; tests substitute mocks.

use crate::types::Result;
use async_trait::async_trait;

/// Generic LLM client trait for provider abstraction
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}
