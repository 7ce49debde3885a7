//! HNSW index wrapper.
//!
//! Wraps `hnsw_rs` with string ids, stored vectors (needed for persistence,
//! the graph itself is never written to disk) and per-vector metadata.

use crate::config::HnswConfig;
use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::types::{SearchResult, StoredRecord, VectorId, VectorMetadata};
use anndists::dist::distances::{DistCosine, DistL2};
use hnsw_rs::hnsw::Hnsw;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, trace};

const MAX_LAYER: usize = 16;
const INITIAL_CAPACITY: usize = 100_000;

/// Thread-safe HNSW index with ID mapping.
pub struct HnswIndex {
    graph: RwLock<Graph>,
    state: RwLock<IndexState>,
    dimensions: usize,
    metric: DistanceMetric,
    config: HnswConfig,
}

enum Graph {
    Cosine(Hnsw<'static, f32, DistCosine>),
    Euclidean(Hnsw<'static, f32, DistL2>),
}

#[derive(Default)]
struct IndexState {
    /// External id -> internal id.
    by_id: HashMap<VectorId, usize>,
    /// Internal id -> record. `None` marks a vector replaced by a later insert;
    /// its node stays in the graph but is never returned.
    records: Vec<Option<Entry>>,
    tombstones: usize,
}

struct Entry {
    id: VectorId,
    vector: Vec<f32>,
    metadata: Option<VectorMetadata>,
}

impl Graph {
    fn new(metric: DistanceMetric, config: &HnswConfig, capacity: usize) -> Self {
        match metric {
            DistanceMetric::Cosine => Graph::Cosine(Hnsw::new(
                config.m,
                capacity,
                MAX_LAYER,
                config.ef_construction,
                DistCosine {},
            )),
            DistanceMetric::Euclidean => Graph::Euclidean(Hnsw::new(
                config.m,
                capacity,
                MAX_LAYER,
                config.ef_construction,
                DistL2 {},
            )),
        }
    }

    fn insert(&self, vector: &[f32], internal_id: usize) {
        match self {
            Graph::Cosine(hnsw) => hnsw.insert((vector, internal_id)),
            Graph::Euclidean(hnsw) => hnsw.insert((vector, internal_id)),
        }
    }

    fn parallel_insert(&self, batch: &[(&Vec<f32>, usize)]) {
        match self {
            Graph::Cosine(hnsw) => hnsw.parallel_insert(batch),
            Graph::Euclidean(hnsw) => hnsw.parallel_insert(batch),
        }
    }

    fn search(&self, query: &[f32], k: usize, ef: usize) -> Vec<(usize, f32)> {
        let neighbours = match self {
            Graph::Cosine(hnsw) => hnsw.search(query, k, ef),
            Graph::Euclidean(hnsw) => hnsw.search(query, k, ef),
        };
        neighbours
            .into_iter()
            .map(|n| (n.d_id, n.distance))
            .collect()
    }
}

impl HnswIndex {
    /// Create an empty index.
    pub fn new(dimensions: usize, metric: DistanceMetric, config: HnswConfig) -> Result<Self> {
        if dimensions == 0 {
            return Err(Error::InvalidVector("Dimensions must be > 0".to_string()));
        }
        config.validate()?;

        Ok(Self {
            graph: RwLock::new(Graph::new(metric, &config, INITIAL_CAPACITY)),
            state: RwLock::new(IndexState::default()),
            dimensions,
            metric,
            config,
        })
    }

    /// Vector dimensions.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Distance metric.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// HNSW parameters.
    pub fn config(&self) -> &HnswConfig {
        &self.config
    }

    /// Number of live vectors.
    pub fn len(&self) -> usize {
        self.state.read().by_id.len()
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a vector with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.state.read().by_id.contains_key(id)
    }

    fn validate(&self, id: &str, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidVector(format!(
                "Vector '{}' contains NaN or Inf",
                id
            )));
        }
        // Cosine distance is undefined for the zero vector.
        if self.metric == DistanceMetric::Cosine && vector.iter().all(|v| *v == 0.0) {
            return Err(Error::InvalidVector(format!(
                "Vector '{}' has zero norm",
                id
            )));
        }
        Ok(())
    }

    /// Register a record and return its internal id. Replaces any previous
    /// vector with the same external id.
    fn register(&self, id: &str, vector: &[f32], metadata: Option<VectorMetadata>) -> usize {
        let mut state = self.state.write();
        let internal_id = state.records.len();

        if let Some(previous) = state.by_id.insert(id.to_string(), internal_id) {
            state.records[previous] = None;
            state.tombstones += 1;
        }
        state.records.push(Some(Entry {
            id: id.to_string(),
            vector: vector.to_vec(),
            metadata,
        }));

        internal_id
    }

    /// Insert a vector. An existing vector with the same id is replaced.
    pub fn insert(&self, id: &str, vector: &[f32], metadata: Option<VectorMetadata>) -> Result<()> {
        self.validate(id, vector)?;
        let internal_id = self.register(id, vector, metadata);
        self.graph.read().insert(vector, internal_id);

        trace!(id, internal_id, "Inserted vector");
        Ok(())
    }

    /// Insert many vectors. All vectors are validated before any is inserted.
    pub fn insert_batch<'a, I>(&self, vectors: I) -> Result<usize>
    where
        I: IntoIterator<Item = (&'a str, &'a [f32], Option<VectorMetadata>)>,
    {
        let items: Vec<_> = vectors.into_iter().collect();
        for (id, vector, _) in &items {
            self.validate(id, vector)?;
        }

        let batch: Vec<(Vec<f32>, usize)> = items
            .into_iter()
            .map(|(id, vector, metadata)| (vector.to_vec(), self.register(id, vector, metadata)))
            .collect();

        let graph = self.graph.read();
        if self.config.parallel_construction {
            let refs: Vec<(&Vec<f32>, usize)> = batch.iter().map(|(v, id)| (v, *id)).collect();
            graph.parallel_insert(&refs);
        } else {
            for (vector, internal_id) in &batch {
                graph.insert(vector, *internal_id);
            }
        }

        debug!(count = batch.len(), "Batch inserted vectors");
        Ok(batch.len())
    }

    /// Search for the `limit` nearest vectors, best first.
    pub fn search(&self, query: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.validate("query", query)?;
        if limit == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let state = self.state.read();
        let wanted = limit + state.tombstones;
        let ef_search = self.config.ef_search.max(wanted);
        let neighbours = self.graph.read().search(query, wanted, ef_search);

        let mut results: Vec<SearchResult> = neighbours
            .into_iter()
            .filter_map(|(internal_id, distance)| {
                let entry = state.records.get(internal_id)?.as_ref()?;
                Some(SearchResult {
                    id: entry.id.clone(),
                    score: self.metric.distance_to_score(distance),
                    metadata: entry.metadata.clone(),
                })
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(limit);
        Ok(results)
    }

    /// Get a vector and its metadata by id.
    pub fn get(&self, id: &str) -> Option<(Vec<f32>, Option<VectorMetadata>)> {
        let state = self.state.read();
        let internal_id = *state.by_id.get(id)?;
        let entry = state.records.get(internal_id)?.as_ref()?;
        Some((entry.vector.clone(), entry.metadata.clone()))
    }

    /// All live vectors in insertion order.
    pub(crate) fn export(&self) -> Vec<StoredRecord> {
        self.state
            .read()
            .records
            .iter()
            .flatten()
            .map(|entry| StoredRecord {
                id: entry.id.clone(),
                vector: entry.vector.clone(),
                metadata: entry.metadata.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> HnswIndex {
        HnswIndex::new(3, DistanceMetric::Cosine, HnswConfig::default()).unwrap()
    }

    #[test]
    fn test_insert_and_search() {
        let index = index();

        index.insert("vec1", &[1.0, 0.0, 0.0], None).unwrap();
        index.insert("vec2", &[0.0, 1.0, 0.0], None).unwrap();
        index.insert("vec3", &[0.9, 0.1, 0.0], None).unwrap();

        assert_eq!(index.len(), 3);

        let results = index.search(&[1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "vec1");
        assert_eq!(results[1].id, "vec3");
        assert!(results[0].score >= results[1].score);
    }

    #[test]
    fn test_dimension_mismatch() {
        let index = index();

        let result = index.insert("vec1", &[1.0, 0.0], None);
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));

        let result = index.search(&[1.0], 1);
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_rejects_nan() {
        let index = index();
        let result = index.insert("bad", &[f32::NAN, 0.0, 0.0], None);
        assert!(matches!(result, Err(Error::InvalidVector(_))));
    }

    #[test]
    fn test_cosine_rejects_zero_vector() {
        let index = index();
        let result = index.insert("zero", &[0.0, 0.0, 0.0], None);
        assert!(matches!(result, Err(Error::InvalidVector(_))));
        assert!(index.is_empty());

        index.insert("vec1", &[1.0, 0.0, 0.0], None).unwrap();
        let result = index.search(&[0.0, 0.0, 0.0], 1);
        assert!(matches!(result, Err(Error::InvalidVector(_))));
    }

    #[test]
    fn test_euclidean_accepts_zero_vector() {
        let index = HnswIndex::new(3, DistanceMetric::Euclidean, HnswConfig::default()).unwrap();
        index.insert("origin", &[0.0, 0.0, 0.0], None).unwrap();
        index.insert("far", &[3.0, 4.0, 0.0], None).unwrap();

        let results = index.search(&[0.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(results[0].id, "origin");
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn test_batch_validates_before_inserting() {
        let index = index();
        let good = [1.0, 0.0, 0.0];
        let bad = [1.0, 0.0];

        let result = index.insert_batch(vec![
            ("good", &good[..], None),
            ("bad", &bad[..], None),
        ]);

        assert!(result.is_err());
        assert!(index.is_empty());
    }

    #[test]
    fn test_replace_same_id() {
        let index = index();

        index.insert("vec1", &[1.0, 0.0, 0.0], None).unwrap();
        index.insert("vec1", &[0.0, 1.0, 0.0], None).unwrap();

        assert_eq!(index.len(), 1);
        let (vector, _) = index.get("vec1").unwrap();
        assert_eq!(vector, vec![0.0, 1.0, 0.0]);

        let results = index.search(&[0.0, 1.0, 0.0], 5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "vec1");
    }

    #[test]
    fn test_search_empty_index() {
        let index = index();
        assert!(index.search(&[1.0, 0.0, 0.0], 3).unwrap().is_empty());
    }

    #[test]
    fn test_metadata_round_trips_through_search() {
        let index = index();
        let meta = VectorMetadata::from_pairs([("text", "hello")]);
        index.insert("vec1", &[1.0, 2.0, 3.0], Some(meta)).unwrap();

        let results = index.search(&[1.0, 2.0, 3.0], 1).unwrap();
        let metadata = results[0].metadata.as_ref().unwrap();
        assert_eq!(metadata.get_string("text"), Some("hello"));
    }
}
