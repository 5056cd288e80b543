use std::collections::BTreeMap;

use recall_filter::FilterExpression;

/// Arguments of one hybrid search. Unset `k` and `limit` take the searcher's
/// configured defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    /// Pre-filter applied by every origin.
    pub filter: Option<FilterExpression>,
    /// Origin name → fusion weight. Empty means the configured default
    /// weights, or every registered origin at weight 1.0.
    pub weights: BTreeMap<String, f64>,
    pub k: Option<u32>,
    pub limit: Option<usize>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: FilterExpression) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_weight(mut self, origin: impl Into<String>, weight: f64) -> Self {
        self.weights.insert(origin.into(), weight);
        self
    }

    pub fn with_weights(mut self, weights: BTreeMap<String, f64>) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_k(mut self, k: u32) -> Self {
        self.k = Some(k);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
