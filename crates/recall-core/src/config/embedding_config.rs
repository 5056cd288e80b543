use serde::{Deserialize, Serialize};

use super::defaults;

/// Embedding oracle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Expected embedding dimensions.
    pub dimensions: usize,
    /// Maximum texts per oracle batch call.
    pub batch_size: usize,
    /// L1 in-memory cache max entries.
    pub l1_cache_size: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimensions: defaults::DEFAULT_EMBEDDING_DIMENSIONS,
            batch_size: defaults::DEFAULT_EMBEDDING_BATCH_SIZE,
            l1_cache_size: defaults::DEFAULT_L1_CACHE_SIZE,
        }
    }
}
