use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What a single origin contributed to a fused score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginContribution {
    pub rank: usize,
    pub raw_score: f64,
    pub rrf_contribution: f64,
}

impl OriginContribution {
    /// Raw origin score as a percentage. Informational only.
    pub fn raw_pct(&self) -> f64 {
        self.raw_score * 100.0
    }
}

/// A candidate after Reciprocal Rank Fusion across all origins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedResult {
    pub id: String,
    pub fused_score: f64,
    /// Keyed by origin name; only origins that returned this id appear.
    pub per_origin: BTreeMap<String, OriginContribution>,
}

impl FusedResult {
    /// Fused score as a percentage. Informational only, not a probability.
    pub fn fused_pct(&self) -> f64 {
        self.fused_score * 100.0
    }

    /// Highest raw score across the origins that returned this id.
    pub fn max_raw_score(&self) -> f64 {
        self.per_origin
            .values()
            .map(|c| c.raw_score)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Origin with the largest RRF contribution (first by name on ties).
    pub fn best_origin(&self) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for (origin, c) in &self.per_origin {
            match best {
                Some((_, score)) if c.rrf_contribution <= score => {}
                _ => best = Some((origin.as_str(), c.rrf_contribution)),
            }
        }
        best.map(|(origin, _)| origin)
    }
}
