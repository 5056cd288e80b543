use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An origin that contributed nothing because it failed or timed out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedOrigin {
    pub origin: String,
    pub reason: String,
}

/// Per-search observability data returned alongside fused results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchMetrics {
    /// Candidates returned per origin (0 for degraded origins).
    pub origin_counts: BTreeMap<String, usize>,
    /// Wall time per origin call in milliseconds.
    pub origin_latency_ms: BTreeMap<String, u64>,
    pub degraded_origins: Vec<DegradedOrigin>,
    /// Distinct ids after fusion, before the limit is applied.
    pub fused_count: usize,
    pub elapsed_ms: u64,
}

impl SearchMetrics {
    pub fn is_degraded(&self) -> bool {
        !self.degraded_origins.is_empty()
    }

    pub fn is_origin_degraded(&self, origin: &str) -> bool {
        self.degraded_origins.iter().any(|d| d.origin == origin)
    }
}
