//! On-disk layout of a vector index.
//!
//! An index directory holds two files:
//! - `index.json` - manifest (dimensions, metric, HNSW parameters, count)
//! - `vectors.json` - every stored vector with its metadata
//!   (`vectors.bin`, postcard encoded, with the `binary` feature)
//!
//! The HNSW graph is rebuilt from the stored vectors on load.

use crate::config::HnswConfig;
use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::index::HnswIndex;
use crate::types::StoredRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Manifest file name.
pub const INDEX_MANIFEST: &str = "index.json";

/// Vector data file name.
#[cfg(not(feature = "binary"))]
pub const VECTORS_FILE: &str = "vectors.json";

/// Vector data file name.
#[cfg(feature = "binary")]
pub const VECTORS_FILE: &str = "vectors.bin";

const FORMAT_VERSION: u32 = 1;

/// Index manifest stored as `index.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexManifest {
    /// Layout version.
    pub version: u32,
    /// Vector dimensions.
    pub dimensions: usize,
    /// Distance metric.
    pub metric: DistanceMetric,
    /// HNSW parameters used at build time.
    pub hnsw: HnswConfig,
    /// Number of stored vectors.
    pub count: usize,
    /// When the index was written.
    pub created_at: DateTime<Utc>,
}

/// Paths of the two files making up an index in `dir`.
pub fn index_files(dir: &Path) -> (PathBuf, PathBuf) {
    (dir.join(INDEX_MANIFEST), dir.join(VECTORS_FILE))
}

/// Whether both index files exist in `dir`.
pub fn index_files_exist(dir: &Path) -> bool {
    let (manifest, vectors) = index_files(dir);
    manifest.is_file() && vectors.is_file()
}

/// Write `index` to `dir`, creating the directory if needed.
pub(crate) async fn save_index(dir: &Path, index: &HnswIndex) -> Result<IndexManifest> {
    tokio::fs::create_dir_all(dir).await?;
    let (manifest_path, vectors_path) = index_files(dir);

    let records = index.export();
    let manifest = IndexManifest {
        version: FORMAT_VERSION,
        dimensions: index.dimensions(),
        metric: index.metric(),
        hnsw: index.config().clone(),
        count: records.len(),
        created_at: Utc::now(),
    };

    let manifest_json = serde_json::to_string_pretty(&manifest)
        .map_err(|e| Error::Persistence(format!("Failed to serialize manifest: {}", e)))?;
    tokio::fs::write(&manifest_path, manifest_json).await?;

    let data = encode_records(&records)?;
    tokio::fs::write(&vectors_path, data).await?;

    info!(path = ?dir, count = manifest.count, "Saved vector index");
    Ok(manifest)
}

/// Read an index from `dir` and rebuild its graph.
pub(crate) async fn load_index(dir: &Path) -> Result<(IndexManifest, HnswIndex)> {
    if !index_files_exist(dir) {
        return Err(Error::IndexNotFound(dir.to_path_buf()));
    }
    let (manifest_path, vectors_path) = index_files(dir);

    let manifest_json = tokio::fs::read_to_string(&manifest_path).await?;
    let manifest: IndexManifest = serde_json::from_str(&manifest_json)
        .map_err(|e| Error::Persistence(format!("Failed to parse {}: {}", INDEX_MANIFEST, e)))?;

    if manifest.version != FORMAT_VERSION {
        return Err(Error::Persistence(format!(
            "Unsupported index version {} (expected {})",
            manifest.version, FORMAT_VERSION
        )));
    }

    let data = tokio::fs::read(&vectors_path).await?;
    let records = decode_records(&data)?;

    if records.len() != manifest.count {
        return Err(Error::Persistence(format!(
            "Manifest lists {} vectors but {} were found",
            manifest.count,
            records.len()
        )));
    }

    let index = HnswIndex::new(manifest.dimensions, manifest.metric, manifest.hnsw.clone())?;
    let batch = records
        .iter()
        .map(|r| (r.id.as_str(), r.vector.as_slice(), r.metadata.clone()));
    index.insert_batch(batch)?;

    debug!(path = ?dir, count = records.len(), "Loaded vector index");
    Ok((manifest, index))
}

#[cfg(not(feature = "binary"))]
fn encode_records(records: &[StoredRecord]) -> Result<Vec<u8>> {
    serde_json::to_vec(records)
        .map_err(|e| Error::Persistence(format!("Failed to serialize vectors: {}", e)))
}

#[cfg(not(feature = "binary"))]
fn decode_records(data: &[u8]) -> Result<Vec<StoredRecord>> {
    serde_json::from_slice(data)
        .map_err(|e| Error::Persistence(format!("Failed to parse {}: {}", VECTORS_FILE, e)))
}

#[cfg(feature = "binary")]
fn encode_records(records: &[StoredRecord]) -> Result<Vec<u8>> {
    postcard::to_allocvec(records)
        .map_err(|e| Error::Persistence(format!("Failed to encode vectors: {}", e)))
}

#[cfg(feature = "binary")]
fn decode_records(data: &[u8]) -> Result<Vec<StoredRecord>> {
    postcard::from_bytes(data)
        .map_err(|e| Error::Persistence(format!("Failed to decode {}: {}", VECTORS_FILE, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VectorMetadata;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let index = HnswIndex::new(2, DistanceMetric::Cosine, HnswConfig::default()).unwrap();
        index
            .insert("a", &[1.0, 0.0], Some(VectorMetadata::from_pairs([("text", "alpha")])))
            .unwrap();
        index.insert("b", &[0.0, 1.0], None).unwrap();

        let manifest = save_index(dir.path(), &index).await.unwrap();
        assert_eq!(manifest.count, 2);
        assert!(index_files_exist(dir.path()));

        let (loaded_manifest, loaded) = load_index(dir.path()).await.unwrap();
        assert_eq!(loaded_manifest.dimensions, 2);
        assert_eq!(loaded.len(), 2);

        let results = loaded.search(&[1.0, 0.0], 1).unwrap();
        assert_eq!(results[0].id, "a");
        assert_eq!(
            results[0].metadata.as_ref().unwrap().get_string("text"),
            Some("alpha")
        );
    }

    #[tokio::test]
    async fn test_missing_index() {
        let dir = TempDir::new().unwrap();
        let result = load_index(dir.path()).await;
        assert!(matches!(result, Err(Error::IndexNotFound(_))));
    }

    #[tokio::test]
    async fn test_corrupt_manifest() {
        let dir = TempDir::new().unwrap();
        let (manifest, vectors) = index_files(dir.path());
        tokio::fs::write(&manifest, "not json").await.unwrap();
        tokio::fs::write(&vectors, "[]").await.unwrap();

        let result = load_index(dir.path()).await;
        assert!(matches!(result, Err(Error::Persistence(_))));
    }
}
