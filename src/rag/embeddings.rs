//! Embedding backends.
//!
//! - [`OllamaEmbedder`] calls the Ollama `/api/embed` endpoint (default).
//! - `FastEmbedder` runs ONNX models in-process (`local-embeddings` feature).

use crate::llm::ollama::ollama_from_url;
use crate::types::{AppError, Result};
use crate::utils::toml_config::{EmbeddingProvider, EmbeddingsConfig, OllamaConfig};
use async_trait::async_trait;
use ollama_rs::generation::embeddings::request::{EmbeddingsInput, GenerateEmbeddingsRequest};
use ollama_rs::Ollama;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Turns text into vectors. Documents and queries share one vector space.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of documents, one vector per input, in order.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a search query.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Model identifier.
    fn model_name(&self) -> &str;
}

/// Embeddings served by Ollama.
pub struct OllamaEmbedder {
    client: Ollama,
    model: String,
    timeout: Duration,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: ollama_from_url(base_url)?,
            model: model.into(),
            timeout,
        })
    }

    async fn embed(&self, input: EmbeddingsInput) -> Result<Vec<Vec<f32>>> {
        let request = GenerateEmbeddingsRequest::new(self.model.clone(), input);
        let response = tokio::time::timeout(self.timeout, self.client.generate_embeddings(request))
            .await
            .map_err(|_| AppError::Embedding(format!("Ollama embedding request timed out after {:?}", self.timeout)))?
            .map_err(|e| AppError::Embedding(format!("Ollama error: {}", e)))?;
        Ok(response.embeddings)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let embeddings = self.embed(EmbeddingsInput::Multiple(texts.to_vec())).await?;
        if embeddings.len() != texts.len() {
            return Err(AppError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }
        debug!(count = texts.len(), model = %self.model, "Embedded documents");
        Ok(embeddings)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(EmbeddingsInput::Single(text.to_string()))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Embedding("Ollama returned no embedding".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(feature = "local-embeddings")]
pub use local::FastEmbedder;

#[cfg(feature = "local-embeddings")]
mod local {
    use super::*;
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use parking_lot::Mutex;

    /// In-process embeddings via fastembed.
    pub struct FastEmbedder {
        model: Arc<Mutex<TextEmbedding>>,
        name: String,
    }

    fn resolve_model(name: &str) -> Result<EmbeddingModel> {
        match name {
            "BAAI/bge-small-en-v1.5" | "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
            "BAAI/bge-base-en-v1.5" | "bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
            "sentence-transformers/all-MiniLM-L6-v2" | "all-minilm-l6-v2" => {
                Ok(EmbeddingModel::AllMiniLML6V2)
            }
            "nomic-ai/nomic-embed-text-v1.5" | "nomic-embed-text" => {
                Ok(EmbeddingModel::NomicEmbedTextV15)
            }
            other => Err(AppError::Config(format!(
                "Unsupported fastembed model: {}",
                other
            ))),
        }
    }

    impl FastEmbedder {
        pub fn new(model_name: &str) -> Result<Self> {
            let model = TextEmbedding::try_new(
                InitOptions::new(resolve_model(model_name)?).with_show_download_progress(true),
            )
            .map_err(|e| AppError::Embedding(format!("Failed to load {}: {}", model_name, e)))?;

            Ok(Self {
                model: Arc::new(Mutex::new(model)),
                name: model_name.to_string(),
            })
        }

        async fn run(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
            let model = Arc::clone(&self.model);
            tokio::task::spawn_blocking(move || {
                model
                    .lock()
                    .embed(texts, None)
                    .map_err(|e| AppError::Embedding(e.to_string()))
            })
            .await
            .map_err(|e| AppError::Internal(format!("Embedding task failed: {}", e)))?
        }
    }

    #[async_trait]
    impl Embedder for FastEmbedder {
        async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            self.run(texts.to_vec()).await
        }

        async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
            self.run(vec![text.to_string()])
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| AppError::Embedding("fastembed returned no embedding".to_string()))
        }

        fn model_name(&self) -> &str {
            &self.name
        }
    }
}

/// Build the embedder selected by `[embeddings]`.
pub fn create_embedder(
    embeddings: &EmbeddingsConfig,
    ollama: &OllamaConfig,
) -> Result<Arc<dyn Embedder>> {
    match embeddings.provider {
        EmbeddingProvider::Ollama => Ok(Arc::new(OllamaEmbedder::new(
            &ollama.base_url,
            embeddings.model.clone(),
            Duration::from_secs(ollama.timeout_secs),
        )?)),
        #[cfg(feature = "local-embeddings")]
        EmbeddingProvider::FastEmbed => Ok(Arc::new(FastEmbedder::new(&embeddings.model)?)),
        #[cfg(not(feature = "local-embeddings"))]
        EmbeddingProvider::FastEmbed => Err(AppError::Config(
            "embeddings.provider = \"fastembed\" requires building with --features local-embeddings"
                .to_string(),
        )),
    }
}
