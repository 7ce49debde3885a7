//! Similarity search over the loaded index.

use crate::rag::embeddings::Embedder;
use crate::rag::indexer::TEXT_KEY;
use crate::types::Result;
use ragbot_vector::VectorStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// A chunk returned by a search, most similar first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub score: f32,
}

/// Embeds queries and searches a [`VectorStore`].
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: VectorStore,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, store: VectorStore) -> Self {
        Self { embedder, store }
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        self.embedder.embed_query(query).await
    }

    /// Top `k` chunks for `query`, dropping hits below `min_score`.
    pub async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        min_score: Option<f32>,
    ) -> Result<Vec<RetrievedChunk>> {
        let vector = self.embed_query(query).await?;
        self.search_by_vector(&vector, k, min_score)
    }

    /// Like [`similarity_search`](Self::similarity_search) with an
    /// already embedded query.
    pub fn search_by_vector(
        &self,
        vector: &[f32],
        k: usize,
        min_score: Option<f32>,
    ) -> Result<Vec<RetrievedChunk>> {
        if self.store.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let hits = match min_score {
            Some(min) => self.store.similarity_search_with_threshold(vector, k, min)?,
            None => self.store.similarity_search(vector, k)?,
        };

        let chunks: Vec<RetrievedChunk> = hits
            .into_iter()
            .map(|hit| RetrievedChunk {
                text: hit
                    .metadata
                    .as_ref()
                    .and_then(|m| m.get_string(TEXT_KEY))
                    .unwrap_or_default()
                    .to_string(),
                score: hit.score,
            })
            .collect();

        debug!(k, returned = chunks.len(), "Retrieved chunks");
        Ok(chunks)
    }
}
