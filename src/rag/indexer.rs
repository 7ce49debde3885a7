//! Index construction: page records in, persisted vector store out.

use crate::rag::chunker::TextChunker;
use crate::rag::document::flatten_pages;
use crate::rag::embeddings::Embedder;
use crate::types::{AppError, PageRecord, Result};
use ragbot_vector::{DistanceMetric, HnswConfig, VectorMetadata, VectorStore};
use tracing::{info, instrument};

/// Metadata key holding a chunk's text
pub const TEXT_KEY: &str = "text";

/// Id given to the `n`th chunk
pub fn chunk_id(n: usize) -> String {
    format!("chunk-{}", n)
}

/// Flatten, chunk, embed and index `pages`.
#[instrument(skip_all, fields(pages = pages.len(), model = embedder.model_name()))]
pub async fn build_index(
    pages: &[PageRecord],
    chunker: &TextChunker,
    embedder: &dyn Embedder,
    batch_size: usize,
) -> Result<VectorStore> {
    let documents = flatten_pages(pages);
    let chunks = chunker.chunk_all(&documents);
    if chunks.is_empty() {
        return Err(AppError::InvalidInput(
            "No text to index: every page is empty".to_string(),
        ));
    }
    info!(documents = documents.len(), chunks = chunks.len(), "Chunked pages");

    let batch_size = batch_size.max(1);
    let mut store: Option<VectorStore> = None;
    for (batch_no, batch) in chunks.chunks(batch_size).enumerate() {
        let embeddings = embedder.embed_documents(batch).await?;
        if embeddings.len() != batch.len() {
            return Err(AppError::Embedding(format!(
                "Embedder returned {} vectors for {} chunks",
                embeddings.len(),
                batch.len()
            )));
        }

        if store.is_none() {
            let dimensions = embeddings.first().map(Vec::len).unwrap_or_default();
            store = Some(VectorStore::new(
                dimensions,
                DistanceMetric::Cosine,
                HnswConfig::default(),
            )?);
        }

        let offset = batch_no * batch_size;
        let ids: Vec<String> = (offset..offset + batch.len()).map(chunk_id).collect();
        if let Some(store) = &store {
            store.add_batch(ids.iter().zip(batch).zip(&embeddings).map(
                |((id, text), vector)| {
                    (
                        id.as_str(),
                        vector.as_slice(),
                        Some(VectorMetadata::from_pairs([(TEXT_KEY, text.as_str())])),
                    )
                },
            ))?;
        }
    }

    let store = store.ok_or_else(|| AppError::Internal("No embeddings produced".to_string()))?;
    info!(chunks = store.len(), dimensions = store.dimensions(), "Built vector index");
    Ok(store)
}
