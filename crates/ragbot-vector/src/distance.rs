//! Distance metrics for vector similarity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Distance metric used by an index.
///
/// Scores returned by searches are always "higher is more similar".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Cosine similarity. Magnitude is ignored; the usual choice for text
    /// embeddings.
    #[default]
    Cosine,

    /// Euclidean (L2) distance, reported as `1 / (1 + dist)`.
    Euclidean,
}

impl DistanceMetric {
    /// Convert a distance reported by the HNSW graph into a score.
    #[inline]
    pub(crate) fn distance_to_score(&self, distance: f32) -> f32 {
        match self {
            // hnsw uses 1 - cos_sim as distance
            DistanceMetric::Cosine => 1.0 - distance,
            DistanceMetric::Euclidean => 1.0 / (1.0 + distance),
        }
    }

    /// Stable name, used in the index manifest.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
