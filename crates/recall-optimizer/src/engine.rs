//! ContextOptimizer: runs the five stages in order over one candidate set.

use std::sync::Arc;
use std::time::Instant;

use recall_core::config::OptimizationBudget;
use recall_core::models::{ContextItem, OptimizationReport};
use recall_core::traits::{IEmbeddingProvider, IRelevanceScorer};
use recall_observability::optimize_span;
use recall_observability::tracing_setup::events;
use tracing::debug;

use crate::oracle::Oracle;
use crate::stages::{compression, dedup, low_information, relevance, token_budget};
use crate::text::estimate_tokens;

/// Shrinks a candidate set to fit a token budget while keeping the most
/// relevant, least redundant content.
///
/// Holds no per-call state; one instance can serve concurrent calls.
#[derive(Clone, Default)]
pub struct ContextOptimizer {
    embedder: Option<Arc<dyn IEmbeddingProvider>>,
    scorer: Option<Arc<dyn IRelevanceScorer>>,
}

impl ContextOptimizer {
    /// An optimizer that uses only text heuristics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `embedder` for duplicate detection and relevance.
    pub fn with_embedder(mut self, embedder: Arc<dyn IEmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Use `scorer` ahead of the embedder in relevance verification.
    pub fn with_scorer(mut self, scorer: Arc<dyn IRelevanceScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Run the pipeline. Never fails: oracle problems switch the affected
    /// stage to its heuristic and set `degraded_scoring` on the report.
    pub fn optimize(
        &self,
        items: Vec<ContextItem>,
        query: &str,
        budget: &OptimizationBudget,
    ) -> (Vec<ContextItem>, OptimizationReport) {
        let span = optimize_span!(items.len(), budget.max_total_tokens);
        let _guard = span.enter();
        let started = Instant::now();

        let chars_per_token = budget.chars_per_token.max(1);
        let input_tokens = total_tokens(&items, chars_per_token);
        let mut report = OptimizationReport {
            input_items: items.len(),
            ..Default::default()
        };
        let mut oracle = Oracle::new(self.embedder.as_deref(), budget.oracle_timeout());

        let mut items = items;
        dedup::remove_duplicate_clauses(
            &mut items,
            budget.clause_dup_threshold,
            &mut oracle,
            &mut report.duplicates,
        );
        let items = dedup::remove_exact_duplicates(items, &mut report.duplicates);
        let (items, similarity) = dedup::remove_near_duplicates(
            items,
            budget.item_dup_threshold,
            &mut oracle,
            &mut report.duplicates,
        );
        debug!(remaining = items.len(), ?similarity, "dedup done");

        let mut items = low_information::filter(items, budget, &mut report.low_information);
        debug!(remaining = items.len(), "low-information filter done");

        compression::compress(
            &mut items,
            query,
            budget,
            similarity,
            &mut oracle,
            &mut report.compression,
        );

        let items = relevance::verify(
            items,
            query,
            budget,
            self.scorer.as_deref(),
            &mut oracle,
            &mut report.relevance,
        );
        let items = token_budget::fit(items, budget, similarity, &mut oracle, &mut report.budget);

        report.degraded_scoring = oracle.degraded();
        report.finish(input_tokens, total_tokens(&items, chars_per_token), items.len());
        events::optimization_completed(
            report.input_items,
            report.output_items,
            report.input_tokens,
            report.output_tokens,
            report.reduction_pct,
        );
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "optimize finished");

        (items, report)
    }
}

/// Estimated tokens across `items`.
pub fn total_tokens(items: &[ContextItem], chars_per_token: usize) -> usize {
    items
        .iter()
        .map(|item| estimate_tokens(&item.text, chars_per_token))
        .sum()
}
