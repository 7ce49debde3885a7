//! # ragbot-vector
//!
//! Embedded vector index backed by HNSW (Hierarchical Navigable Small World)
//! for approximate nearest neighbour search over document chunks.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ragbot_vector::{DistanceMetric, HnswConfig, VectorMetadata, VectorStore};
//!
//! let store = VectorStore::new(384, DistanceMetric::Cosine, HnswConfig::default())?;
//! store.add("chunk-0", &embedding, Some(VectorMetadata::from_pairs([("text", "...")])))?;
//! store.save("vectorstore").await?;
//!
//! let store = VectorStore::load("vectorstore").await?;
//! let hits = store.similarity_search(&query, 4)?;
//! ```
//!
//! ## Layout
//!
//! ```text
//! vectorstore/
//! ├── index.json     manifest: dimensions, metric, HNSW params, count
//! └── vectors.json   id + vector + metadata for every chunk
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod distance;
pub mod error;
pub mod index;
pub mod persistence;
pub mod types;

pub use config::HnswConfig;
pub use distance::DistanceMetric;
pub use error::{Error, Result};
pub use index::HnswIndex;
pub use persistence::{index_files_exist, IndexManifest, INDEX_MANIFEST, VECTORS_FILE};
pub use types::{MetadataValue, SearchResult, VectorId, VectorMetadata};

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A single vector index with persistence.
///
/// Cloning is cheap; clones share the same index.
#[derive(Clone)]
pub struct VectorStore {
    index: Arc<HnswIndex>,
}

impl VectorStore {
    /// Create an empty store.
    pub fn new(dimensions: usize, metric: DistanceMetric, hnsw: HnswConfig) -> Result<Self> {
        Ok(Self {
            index: Arc::new(HnswIndex::new(dimensions, metric, hnsw)?),
        })
    }

    /// Vector dimensions.
    pub fn dimensions(&self) -> usize {
        self.index.dimensions()
    }

    /// Distance metric.
    pub fn metric(&self) -> DistanceMetric {
        self.index.metric()
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Whether a vector with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Get a vector and its metadata by id.
    pub fn get(&self, id: &str) -> Option<(Vec<f32>, Option<VectorMetadata>)> {
        self.index.get(id)
    }

    /// Add one vector.
    #[instrument(skip(self, vector, metadata), fields(dim = vector.len()))]
    pub fn add(&self, id: &str, vector: &[f32], metadata: Option<VectorMetadata>) -> Result<()> {
        self.index.insert(id, vector, metadata)
    }

    /// Add many vectors. Nothing is added if any vector is invalid.
    #[instrument(skip(self, vectors))]
    pub fn add_batch<'a, I>(&self, vectors: I) -> Result<usize>
    where
        I: IntoIterator<Item = (&'a str, &'a [f32], Option<VectorMetadata>)>,
    {
        let count = self.index.insert_batch(vectors)?;
        debug!(count, "Inserted batch");
        Ok(count)
    }

    /// Return up to `k` nearest vectors, most similar first.
    #[instrument(skip(self, query), fields(k, dim = query.len()))]
    pub fn similarity_search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        let results = self.index.search(query, k)?;
        debug!(count = results.len(), "Search completed");
        Ok(results)
    }

    /// Like [`similarity_search`](Self::similarity_search) but drops hits
    /// scoring below `min_score`.
    pub fn similarity_search_with_threshold(
        &self,
        query: &[f32],
        k: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let mut results = self.similarity_search(query, k)?;
        results.retain(|r| r.score >= min_score);
        Ok(results)
    }

    /// Write the store to `dir`.
    #[instrument(skip(self, dir), fields(dir = %dir.as_ref().display()))]
    pub async fn save(&self, dir: impl AsRef<Path>) -> Result<IndexManifest> {
        persistence::save_index(dir.as_ref(), &self.index).await
    }

    /// Load a store previously written with [`save`](Self::save).
    #[instrument(skip(dir), fields(dir = %dir.as_ref().display()))]
    pub async fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let (manifest, index) = persistence::load_index(dir.as_ref()).await?;
        info!(
            count = manifest.count,
            dimensions = manifest.dimensions,
            metric = %manifest.metric,
            "Loaded vector store"
        );
        Ok(Self {
            index: Arc::new(index),
        })
    }
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("dimensions", &self.dimensions())
            .field("metric", &self.metric())
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_and_search() {
        let store = VectorStore::new(3, DistanceMetric::Cosine, HnswConfig::default()).unwrap();

        store.add("vec1", &[1.0, 0.0, 0.0], None).unwrap();
        store.add("vec2", &[0.0, 1.0, 0.0], None).unwrap();
        store.add("vec3", &[0.9, 0.1, 0.0], None).unwrap();

        let results = store.similarity_search(&[1.0, 0.0, 0.0], 10).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].id, "vec1");
    }

    #[test]
    fn test_threshold_filters_low_scores() {
        let store = VectorStore::new(2, DistanceMetric::Cosine, HnswConfig::default()).unwrap();
        store.add("same", &[1.0, 0.0], None).unwrap();
        store.add("orthogonal", &[0.0, 1.0], None).unwrap();

        let results = store
            .similarity_search_with_threshold(&[1.0, 0.0], 2, 0.5)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "same");
    }

    #[tokio::test]
    async fn test_persist_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::new(2, DistanceMetric::Euclidean, HnswConfig::fast()).unwrap();
        store
            .add_batch(vec![
                ("a", &[0.0f32, 0.0][..], None),
                ("b", &[5.0f32, 5.0][..], None),
            ])
            .unwrap();
        store.save(dir.path()).await.unwrap();

        let loaded = VectorStore::load(dir.path()).await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.metric(), DistanceMetric::Euclidean);
        assert!(loaded.contains("b"));
    }
}
