use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::ConfigError;

/// Immutable per-call configuration for the context optimizer.
///
/// Passed by reference into every `optimize()` call. Presets are plain
/// constructors; nothing here is process-global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationBudget {
    /// Aggregate estimated-token ceiling for the output set.
    pub max_total_tokens: usize,
    /// Maximum items kept per origin tag.
    pub max_per_source: usize,
    /// Cosine similarity at or above which two items are near-duplicates.
    pub item_dup_threshold: f64,
    /// Cosine similarity at or above which two clauses of one item are duplicates.
    pub clause_dup_threshold: f64,
    /// Normalized character entropy below which an item is low-information.
    pub entropy_threshold: f64,
    /// Items shorter than this many characters are dropped.
    pub min_length: usize,
    /// Minimum relevance score an item needs to survive verification.
    pub relevance_threshold: f64,
    /// Upper bound on relevance verification passes.
    pub max_iterations: usize,
    /// Relevance verification never shrinks the set below this size.
    pub min_retention: usize,
    /// Characters per estimated token.
    pub chars_per_token: usize,
    /// Smallest remaining budget (tokens) worth filling with a truncated item.
    pub min_useful_tokens: usize,
    /// Clauses kept by query-focused compression.
    pub max_compressed_clauses: usize,
    /// Fraction of length compression must save to replace an item.
    pub min_compression_savings: f64,
    /// Deadline for embedding-oracle calls within one `optimize()` call.
    pub oracle_timeout_ms: Option<u64>,
}

impl Default for OptimizationBudget {
    fn default() -> Self {
        Self {
            max_total_tokens: defaults::DEFAULT_MAX_TOTAL_TOKENS,
            max_per_source: defaults::DEFAULT_MAX_PER_SOURCE,
            item_dup_threshold: defaults::DEFAULT_ITEM_DUP_THRESHOLD,
            clause_dup_threshold: defaults::DEFAULT_CLAUSE_DUP_THRESHOLD,
            entropy_threshold: defaults::DEFAULT_ENTROPY_THRESHOLD,
            min_length: defaults::DEFAULT_MIN_LENGTH,
            relevance_threshold: defaults::DEFAULT_RELEVANCE_THRESHOLD,
            max_iterations: defaults::DEFAULT_MAX_ITERATIONS,
            min_retention: defaults::DEFAULT_MIN_RETENTION,
            chars_per_token: defaults::DEFAULT_CHARS_PER_TOKEN,
            min_useful_tokens: defaults::DEFAULT_MIN_USEFUL_TOKENS,
            max_compressed_clauses: defaults::DEFAULT_MAX_COMPRESSED_CLAUSES,
            min_compression_savings: defaults::DEFAULT_MIN_COMPRESSION_SAVINGS,
            oracle_timeout_ms: None,
        }
    }
}

impl OptimizationBudget {
    /// Keeps more context: looser dedup, lower relevance bar, larger budget.
    pub fn conservative() -> Self {
        Self {
            max_total_tokens: 8_000,
            max_per_source: 20,
            item_dup_threshold: 0.92,
            clause_dup_threshold: 0.95,
            entropy_threshold: 0.2,
            min_length: 5,
            relevance_threshold: 0.5,
            max_iterations: 2,
            min_retention: 5,
            ..Self::default()
        }
    }

    /// The default thresholds.
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Cuts hard: tighter dedup, higher relevance bar, small budget.
    pub fn aggressive() -> Self {
        Self {
            max_total_tokens: 2_000,
            max_per_source: 5,
            item_dup_threshold: 0.80,
            clause_dup_threshold: 0.82,
            entropy_threshold: 0.4,
            min_length: 20,
            relevance_threshold: 0.75,
            max_iterations: 5,
            min_retention: 2,
            max_compressed_clauses: 3,
            ..Self::default()
        }
    }

    /// Favors precision of what is kept over volume.
    pub fn quality() -> Self {
        Self {
            max_total_tokens: 6_000,
            item_dup_threshold: 0.90,
            clause_dup_threshold: 0.92,
            entropy_threshold: 0.35,
            min_length: 15,
            relevance_threshold: 0.7,
            max_iterations: 4,
            min_retention: 5,
            ..Self::default()
        }
    }

    /// Resolve a preset by name.
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name.to_ascii_lowercase().as_str() {
            "conservative" => Ok(Self::conservative()),
            "balanced" | "default" => Ok(Self::balanced()),
            "aggressive" => Ok(Self::aggressive()),
            "quality" => Ok(Self::quality()),
            _ => Err(ConfigError::UnknownPreset {
                name: name.to_string(),
            }),
        }
    }

    /// Override the token ceiling.
    pub fn with_max_total_tokens(mut self, max_total_tokens: usize) -> Self {
        self.max_total_tokens = max_total_tokens;
        self
    }

    /// Oracle deadline as a `Duration`, if set.
    pub fn oracle_timeout(&self) -> Option<Duration> {
        self.oracle_timeout_ms.map(Duration::from_millis)
    }

    /// Reject values the optimizer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_fields = [
            ("item_dup_threshold", self.item_dup_threshold),
            ("clause_dup_threshold", self.clause_dup_threshold),
            ("entropy_threshold", self.entropy_threshold),
            ("relevance_threshold", self.relevance_threshold),
            ("min_compression_savings", self.min_compression_savings),
        ];
        for (field, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("{value} is outside [0, 1]"),
                });
            }
        }
        if self.chars_per_token == 0 {
            return Err(ConfigError::InvalidValue {
                field: "chars_per_token".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_iterations".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
