use serde::{Deserialize, Serialize};

/// Stage 1 counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DedupStageCounts {
    /// Clauses dropped inside items.
    pub clauses_removed: usize,
    /// Items whose text was rewritten by clause removal.
    pub items_changed: usize,
    /// Items dropped because their normalized text hash repeated.
    pub exact_removed: usize,
    /// Items dropped as near-duplicates of an earlier kept item.
    pub near_removed: usize,
}

/// Stage 2 counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LowInformationStageCounts {
    pub too_short: usize,
    pub low_entropy: usize,
}

/// Stage 3 counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompressionStageCounts {
    pub compressed: usize,
    pub chars_saved: usize,
}

/// Stage 4 counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelevanceStageCounts {
    pub removed: usize,
    /// Scoring passes actually run.
    pub iterations: usize,
    /// All survivors met the threshold before the iteration cap.
    pub converged: bool,
    /// The min-retention safeguard kept the top scorers instead of dropping.
    pub retention_safeguard: bool,
}

/// Stage 5 counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetStageCounts {
    pub dropped: usize,
    pub truncated: usize,
    pub per_source_skipped: usize,
}

/// What one `optimize()` call did, stage by stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub duplicates: DedupStageCounts,
    pub low_information: LowInformationStageCounts,
    pub compression: CompressionStageCounts,
    pub relevance: RelevanceStageCounts,
    pub budget: BudgetStageCounts,
    pub input_items: usize,
    pub output_items: usize,
    pub input_tokens: usize,
    pub output_tokens: usize,
    /// `100 * (1 - output_tokens / input_tokens)`, 0 for empty input.
    pub reduction_pct: f64,
    /// The embedding oracle failed somewhere and a heuristic was used instead.
    pub degraded_scoring: bool,
}

impl OptimizationReport {
    /// Total items removed across all stages.
    pub fn items_removed(&self) -> usize {
        self.input_items.saturating_sub(self.output_items)
    }

    fn reduction(input_tokens: usize, output_tokens: usize) -> f64 {
        if input_tokens == 0 {
            return 0.0;
        }
        100.0 * (1.0 - output_tokens as f64 / input_tokens as f64)
    }

    /// Fill in the totals once the pipeline has run.
    pub fn finish(&mut self, input_tokens: usize, output_tokens: usize, output_items: usize) {
        self.input_tokens = input_tokens;
        self.output_tokens = output_tokens;
        self.output_items = output_items;
        self.reduction_pct = Self::reduction(input_tokens, output_tokens);
    }
}
