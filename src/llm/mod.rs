//! LLM access.
//!
//! - [`LLMClient`] - completion trait used by the answering pipeline
//! - [`OllamaClient`] - Ollama chat API plus model listing for preflight

pub mod client;
pub mod ollama;

pub use client::LLMClient;
pub use ollama::OllamaClient;
