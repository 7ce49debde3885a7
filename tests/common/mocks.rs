//! Mock implementations for testing.
//!
//! Shared by the integration tests so no test talks to a real Ollama server.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use ragbot::llm::LLMClient;
use ragbot::rag::Embedder;
use ragbot::types::{AppError, Result};
use std::sync::Arc;

/// Mock LLM client with a fixed response that records every prompt.
#[derive(Clone)]
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockLLMClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A client whose every call fails like an unreachable server.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new("")
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    fn respond(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.respond(prompt)
    }

    async fn generate_with_system(&self, _system: &str, prompt: &str) -> Result<String> {
        self.respond(prompt)
    }

    fn model_name(&self) -> &str {
        "mock-llm"
    }
}

/// Dimensions of [`MockEmbedder`] vectors
pub const MOCK_DIMENSIONS: usize = 64;

/// Deterministic bag-of-words embedder: texts sharing words land close
/// together.
#[derive(Clone, Default)]
pub struct MockEmbedder;

impl MockEmbedder {
    pub fn embed(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; MOCK_DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            let mut hash: u64 = 0xcbf29ce484222325;
            for byte in word.bytes() {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(0x100000001b3);
            }
            vector[(hash % MOCK_DIMENSIONS as u64) as usize] += 1.0;
        }
        // Keep empty texts off the zero vector
        vector[0] += 0.01;
        vector
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::embed(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::embed(text))
    }

    fn model_name(&self) -> &str {
        "mock-embed"
    }
}
