use serde::{Deserialize, Serialize};

/// One entry of a single origin's ranked list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub id: String,
    /// Name of the origin that produced this candidate.
    pub origin: String,
    /// The origin's own score (similarity, BM25, ...). Not comparable across origins.
    pub raw_score: f64,
    /// 1-based position within the origin's list.
    pub rank: usize,
}

impl RankedCandidate {
    /// Build candidates from an origin's ordered `(id, score)` list, assigning 1-based ranks.
    pub fn from_ordered(origin: &str, results: Vec<(String, f64)>) -> Vec<Self> {
        results
            .into_iter()
            .enumerate()
            .map(|(i, (id, raw_score))| Self {
                id,
                origin: origin.to_string(),
                raw_score,
                rank: i + 1,
            })
            .collect()
    }
}
