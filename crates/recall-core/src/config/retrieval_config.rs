use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Hybrid search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// RRF smoothing constant.
    pub rrf_k: u32,
    /// Number of fused results returned when the caller gives no limit.
    pub default_limit: usize,
    /// Each origin is asked for `limit * over_fetch_factor` candidates.
    pub over_fetch_factor: usize,
    /// Per-origin call timeout (milliseconds).
    pub origin_timeout_ms: u64,
    /// Whole-search timeout (milliseconds).
    pub search_timeout_ms: u64,
    /// Upper bound on origin calls in flight for one search.
    pub max_concurrent_origins: usize,
    /// Origin name → fusion weight used when the caller passes no weights.
    pub default_weights: BTreeMap<String, f64>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            rrf_k: defaults::DEFAULT_RRF_K,
            default_limit: defaults::DEFAULT_SEARCH_LIMIT,
            over_fetch_factor: defaults::DEFAULT_OVER_FETCH_FACTOR,
            origin_timeout_ms: defaults::DEFAULT_ORIGIN_TIMEOUT_MS,
            search_timeout_ms: defaults::DEFAULT_SEARCH_TIMEOUT_MS,
            max_concurrent_origins: defaults::DEFAULT_MAX_CONCURRENT_ORIGINS,
            default_weights: BTreeMap::new(),
        }
    }
}
