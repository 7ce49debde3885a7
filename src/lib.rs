//! # ragbot
//!
//! Retrieval-augmented question answering over a PDF collection.
//!
//! The pipeline runs as separate stages:
//!
//! 1. [`extraction`] - PDFs to page records (text and tables)
//! 2. [`merge`] - attach image captions to page records
//! 3. [`rag::indexer`] - chunk, embed and persist a vector index
//! 4. [`api`] - answer `POST /ask` from the index with an Ollama model
//! 5. [`preflight`] - check Ollama, the models and the index before serving
//!
//! All settings come from `ragbot.toml` ([`utils::toml_config`]).

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// PDF text and table extraction.
pub mod extraction;
/// LLM client abstraction and the Ollama client.
pub mod llm;
/// Image caption merging.
pub mod merge;
/// Startup checks.
pub mod preflight;
/// Retrieval Augmented Generation (RAG) components.
pub mod rag;
/// Core types (page records, requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

pub use llm::{LLMClient, OllamaClient};
pub use rag::{Embedder, RetrievalQa, Retriever};
pub use types::{AppError, Result};
pub use utils::toml_config::{ConfigManager, RagbotConfig};

use ragbot_vector::VectorStore;
use std::sync::Arc;
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML configuration with hot-reload support
    pub config_manager: Arc<ConfigManager>,
    /// Question answering over the loaded index
    pub qa: Arc<RetrievalQa>,
}

impl AppState {
    pub fn new(config_manager: Arc<ConfigManager>, qa: RetrievalQa) -> Self {
        Self {
            config_manager,
            qa: Arc::new(qa),
        }
    }

    /// Load the index and connect the embedder and LLM named in the
    /// current configuration.
    pub async fn load(config_manager: Arc<ConfigManager>) -> Result<Self> {
        let config = config_manager.config();

        let store = VectorStore::load(&config.paths.index_dir).await?;
        info!(
            index_dir = %config.paths.index_dir.display(),
            chunks = store.len(),
            "Vector index loaded"
        );

        let embedder = rag::create_embedder(&config.embeddings, &config.ollama)?;
        let llm: Arc<dyn LLMClient> = Arc::new(OllamaClient::from_config(&config.ollama)?);
        info!(
            model = llm.model_name(),
            embedding_model = embedder.model_name(),
            "Models configured"
        );

        let qa = RetrievalQa::new(
            Retriever::new(embedder, store),
            llm,
            Arc::clone(&config_manager),
        );
        Ok(Self::new(config_manager, qa))
    }
}
