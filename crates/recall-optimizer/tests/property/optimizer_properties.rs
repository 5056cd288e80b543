use std::sync::Arc;

use proptest::prelude::*;
use recall_core::config::OptimizationBudget;
use recall_core::models::{ContextItem, OptimizationReport};
use recall_embeddings::HashingEmbedder;
use recall_optimizer::{total_tokens, ContextOptimizer};

const WORDS: &[&str] = &[
    "rank", "fusion", "vector", "lexical", "origin", "shard", "index", "budget", "token", "cache",
    "query", "filter", "record", "score", "merge", "latency",
];
const CONNECTORS: &[&str] = &[". ", " and ", " but ", "\n", " "];

fn sentence() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 1..6).prop_map(|w| w.join(" "))
}

/// Text made of sentences joined by terminators, conjunctions, and newlines.
/// Sentences repeat often enough to exercise clause dedup.
fn text() -> impl Strategy<Value = String> {
    prop::collection::vec((sentence(), prop::sample::select(CONNECTORS)), 1..6).prop_map(|parts| {
        let mut out = String::new();
        for (sentence, connector) in parts {
            out.push_str(&sentence);
            out.push_str(connector);
        }
        out.trim().to_string()
    })
}

fn items() -> impl Strategy<Value = Vec<ContextItem>> {
    prop::collection::vec(
        (text(), prop::sample::select(vec!["vector", "lexical", "tag_index"])),
        0..12,
    )
    .prop_map(|parts| {
        parts
            .into_iter()
            .enumerate()
            .map(|(i, (text, origin))| ContextItem::new(format!("item-{i}"), text, origin))
            .collect()
    })
}

fn query() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 1..4).prop_map(|w| w.join(" "))
}

fn removed_by_dedup_or_entropy(report: &OptimizationReport) -> usize {
    report.duplicates.clauses_removed
        + report.duplicates.exact_removed
        + report.duplicates.near_removed
        + report.low_information.too_short
        + report.low_information.low_entropy
}

/// Roomy enough that truncation never rewrites text between passes.
fn roomy() -> OptimizationBudget {
    OptimizationBudget {
        max_total_tokens: 1_000_000,
        max_per_source: 1_000,
        min_length: 4,
        ..Default::default()
    }
}

/// Small enough that the last item is often cut to fit.
fn tight(max_total_tokens: usize, min_useful_tokens: usize) -> OptimizationBudget {
    OptimizationBudget {
        max_total_tokens,
        min_useful_tokens,
        max_per_source: 1_000,
        min_length: 4,
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn output_never_exceeds_budget(
        items in items(),
        query in query(),
        max_total_tokens in 0usize..80,
        min_useful_tokens in 0usize..20,
    ) {
        let budget = OptimizationBudget {
            max_total_tokens,
            min_useful_tokens,
            min_retention: 1,
            ..Default::default()
        };
        let (out, report) = ContextOptimizer::new().optimize(items, &query, &budget);
        prop_assert!(total_tokens(&out, budget.chars_per_token) <= max_total_tokens);
        prop_assert_eq!(report.output_tokens, total_tokens(&out, budget.chars_per_token));
    }

    #[test]
    fn second_pass_removes_nothing_without_oracle(items in items(), query in query()) {
        let optimizer = ContextOptimizer::new();
        let budget = roomy();
        let (once, _) = optimizer.optimize(items, &query, &budget);
        let (twice, report) = optimizer.optimize(once.clone(), &query, &budget);
        prop_assert_eq!(removed_by_dedup_or_entropy(&report), 0, "first pass: {:?}", once);
        prop_assert!(twice.len() <= once.len());
    }

    #[test]
    fn second_pass_removes_nothing_with_oracle(items in items(), query in query()) {
        let optimizer = ContextOptimizer::new().with_embedder(Arc::new(HashingEmbedder::new(64)));
        let budget = roomy();
        let (once, _) = optimizer.optimize(items, &query, &budget);
        let (_, report) = optimizer.optimize(once.clone(), &query, &budget);
        prop_assert_eq!(removed_by_dedup_or_entropy(&report), 0, "first pass: {:?}", once);
    }

    #[test]
    fn output_is_a_subset_in_input_order(items in items(), query in query()) {
        let ids: Vec<String> = items.iter().map(|i| i.id.clone()).collect();
        let (out, _) = ContextOptimizer::new().optimize(items, &query, &OptimizationBudget::default());
        let mut cursor = ids.iter();
        for item in &out {
            prop_assert!(cursor.any(|id| *id == item.id), "{} out of order", item.id);
        }
    }

    #[test]
    fn second_pass_removes_nothing_after_truncation(
        items in items(),
        query in query(),
        max_total_tokens in 5usize..60,
        min_useful_tokens in 0usize..5,
    ) {
        let optimizer = ContextOptimizer::new();
        let budget = tight(max_total_tokens, min_useful_tokens);
        let (once, _) = optimizer.optimize(items, &query, &budget);
        let (_, report) = optimizer.optimize(once.clone(), &query, &budget);
        prop_assert_eq!(removed_by_dedup_or_entropy(&report), 0, "first pass: {:?}", once);
    }

    #[test]
    fn second_pass_removes_nothing_after_truncation_with_oracle(
        items in items(),
        query in query(),
        max_total_tokens in 5usize..60,
        min_useful_tokens in 0usize..5,
    ) {
        let optimizer = ContextOptimizer::new().with_embedder(Arc::new(HashingEmbedder::new(64)));
        let budget = tight(max_total_tokens, min_useful_tokens);
        let (once, _) = optimizer.optimize(items, &query, &budget);
        let (_, report) = optimizer.optimize(once.clone(), &query, &budget);
        prop_assert_eq!(removed_by_dedup_or_entropy(&report), 0, "first pass: {:?}", once);
    }
}
