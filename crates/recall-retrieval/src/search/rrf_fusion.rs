//! Weighted Reciprocal Rank Fusion: score = Σ weight_o / (k + rank_o)
//!
//! Combines any number of ranked lists without normalizing scores across
//! origins. An id absent from an origin gets nothing from it.

use std::collections::BTreeMap;

use recall_core::models::{FusedResult, OriginContribution, RankedCandidate};

/// One origin's ranked list and its fusion weight.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedRanking {
    pub origin: String,
    pub weight: f64,
    /// Candidates with 1-based `rank`s, best first.
    pub candidates: Vec<RankedCandidate>,
}

impl WeightedRanking {
    pub fn new(origin: impl Into<String>, weight: f64, candidates: Vec<RankedCandidate>) -> Self {
        Self {
            origin: origin.into(),
            weight,
            candidates,
        }
    }

    /// Build from an origin's ordered `(id, score)` list.
    pub fn from_ordered(origin: &str, weight: f64, results: Vec<(String, f64)>) -> Self {
        Self::new(origin, weight, RankedCandidate::from_ordered(origin, results))
    }
}

/// Contribution of one appearance at `rank` in an origin of `weight`.
pub fn rrf_contribution(weight: f64, k: u32, rank: usize) -> f64 {
    weight / (k as f64 + rank as f64)
}

/// Fuse `rankings` into one list sorted by fused score descending; ties go to
/// the higher best raw score, then to the smaller id.
///
/// Pure: the output depends only on the arguments. If an origin lists an id
/// more than once, only its best rank counts.
pub fn fuse(rankings: &[WeightedRanking], k: u32) -> Vec<FusedResult> {
    let mut fused: BTreeMap<&str, FusedResult> = BTreeMap::new();

    for ranking in rankings {
        for candidate in &ranking.candidates {
            let entry = fused
                .entry(candidate.id.as_str())
                .or_insert_with(|| FusedResult {
                    id: candidate.id.clone(),
                    fused_score: 0.0,
                    per_origin: BTreeMap::new(),
                });
            if entry.per_origin.contains_key(&ranking.origin) {
                continue;
            }
            let contribution = rrf_contribution(ranking.weight, k, candidate.rank);
            entry.fused_score += contribution;
            entry.per_origin.insert(
                ranking.origin.clone(),
                OriginContribution {
                    rank: candidate.rank,
                    raw_score: candidate.raw_score,
                    rrf_contribution: contribution,
                },
            );
        }
    }

    let mut results: Vec<FusedResult> = fused.into_values().collect();
    results.sort_by(|a, b| {
        b.fused_score
            .total_cmp(&a.fused_score)
            .then_with(|| b.max_raw_score().total_cmp(&a.max_raw_score()))
            .then_with(|| a.id.cmp(&b.id))
    });
    results
}
