//! HNSW tuning parameters.

use serde::{Deserialize, Serialize};

/// HNSW index configuration.
///
/// These parameters trade search accuracy against build time and memory.
/// They are written to the index manifest so a loaded index is rebuilt with
/// the same settings it was saved with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HnswConfig {
    /// Maximum number of connections per element per layer.
    ///
    /// Typical values: 12-48. Default: 16.
    pub m: usize,

    /// Size of the dynamic candidate list during construction.
    ///
    /// Typical values: 100-500. Default: 200.
    pub ef_construction: usize,

    /// Size of the dynamic candidate list during search.
    ///
    /// Raised to `k` at query time when smaller. Default: 100.
    pub ef_search: usize,

    /// Use parallel insertion for batches.
    pub parallel_construction: bool,
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construction: 200,
            ef_search: 100,
            parallel_construction: true,
        }
    }
}

impl HnswConfig {
    /// Smaller graph, faster build. Good enough for a few thousand chunks.
    pub fn fast() -> Self {
        Self {
            m: 8,
            ef_construction: 100,
            ef_search: 50,
            parallel_construction: true,
        }
    }

    /// Set the M parameter (connections per layer).
    pub fn with_m(mut self, m: usize) -> Self {
        self.m = m;
        self
    }

    /// Check the parameters are usable by `hnsw_rs`.
    pub fn validate(&self) -> crate::Result<()> {
        if self.m == 0 {
            return Err(crate::Error::Configuration("m must be > 0".to_string()));
        }
        if self.ef_construction == 0 || self.ef_search == 0 {
            return Err(crate::Error::Configuration(
                "ef_construction and ef_search must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let fast = HnswConfig::fast();
        let default = HnswConfig::default();

        assert!(fast.m < default.m);
        assert!(fast.ef_construction < default.ef_construction);
        assert!(fast.validate().is_ok());
        assert!(default.validate().is_ok());
    }

    #[test]
    fn test_zero_m_rejected() {
        let config = HnswConfig::default().with_m(0);
        assert!(config.validate().is_err());
    }
}
