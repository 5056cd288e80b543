use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use recall_core::config::OptimizationBudget;
use recall_core::errors::{EmbeddingError, RecallResult};
use recall_core::models::ContextItem;
use recall_core::traits::{IEmbeddingProvider, IRelevanceScorer};
use recall_embeddings::HashingEmbedder;
use recall_optimizer::{total_tokens, ContextOptimizer};
use serde_json::Value;

struct FailingOracle;

impl IEmbeddingProvider for FailingOracle {
    fn embed(&self, _text: &str) -> RecallResult<Vec<f32>> {
        Err(EmbeddingError::InferenceFailed { reason: "model crashed".into() }.into())
    }
    fn embed_batch(&self, _texts: &[String]) -> RecallResult<Vec<Vec<f32>>> {
        Err(EmbeddingError::InferenceFailed { reason: "model crashed".into() }.into())
    }
    fn dimensions(&self) -> usize {
        64
    }
    fn name(&self) -> &str {
        "failing"
    }
    fn is_available(&self) -> bool {
        true
    }
}

/// Correct vectors, delivered too late.
struct SlowOracle(HashingEmbedder);

impl IEmbeddingProvider for SlowOracle {
    fn embed(&self, text: &str) -> RecallResult<Vec<f32>> {
        sleep(Duration::from_millis(30));
        self.0.embed(text)
    }
    fn embed_batch(&self, texts: &[String]) -> RecallResult<Vec<Vec<f32>>> {
        sleep(Duration::from_millis(30));
        self.0.embed_batch(texts)
    }
    fn dimensions(&self) -> usize {
        self.0.dimensions()
    }
    fn name(&self) -> &str {
        "slow"
    }
    fn is_available(&self) -> bool {
        true
    }
}

struct PerfectScorer;

impl IRelevanceScorer for PerfectScorer {
    fn score(&self, _query: &str, texts: &[String]) -> RecallResult<Vec<f64>> {
        Ok(vec![1.0; texts.len()])
    }
    fn name(&self) -> &str {
        "perfect"
    }
}

fn fixture_items(fixture: &Value) -> Vec<ContextItem> {
    fixture["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| {
            ContextItem::new(
                item["id"].as_str().unwrap(),
                item["text"].as_str().unwrap(),
                item["origin"].as_str().unwrap(),
            )
        })
        .collect()
}

fn ids(items: &[ContextItem]) -> Vec<&str> {
    items.iter().map(|i| i.id.as_str()).collect()
}

fn notes() -> Vec<ContextItem> {
    vec![
        ContextItem::new("n1", "Reciprocal rank fusion combines ranked lists from several origins.", "vector"),
        ContextItem::new("n2", "Rank fusion ignores raw scores and uses positions only.", "lexical"),
        ContextItem::new("n3", "The lexical origin scores documents with BM25 weighting.", "lexical"),
        ContextItem::new("n4", "Fusion of ranks favors documents found by several origins.", "vector"),
    ]
}

#[test]
fn golden_duplicates_and_noise() {
    let fixture = test_fixtures::load_fixture_value("golden/optimizer/duplicates_and_noise.json");
    let query = fixture["query"].as_str().unwrap();

    let (out, report) =
        ContextOptimizer::new().optimize(fixture_items(&fixture), query, &OptimizationBudget::default());

    let expected: Vec<&str> = fixture["expected_survivor_ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(ids(&out), expected);
    assert_eq!(
        report.duplicates.exact_removed as u64,
        fixture["expected_exact_removed"].as_u64().unwrap()
    );
    assert_eq!(
        report.low_information.too_short as u64,
        fixture["expected_too_short"].as_u64().unwrap()
    );
    assert!(!report.degraded_scoring);
}

#[test]
fn short_item_dropped_even_with_perfect_relevance() {
    let optimizer = ContextOptimizer::new().with_scorer(Arc::new(PerfectScorer));
    let items = vec![
        ContextItem::new("b1", "ok.", "vector"),
        ContextItem::new("b2", "Rank fusion combines ranked lists.", "vector"),
    ];
    let (out, report) = optimizer.optimize(items, "rank fusion", &OptimizationBudget::default());
    assert_eq!(ids(&out), vec!["b2"]);
    assert_eq!(report.low_information.too_short, 1);
    assert_eq!(report.relevance.removed, 0);
}

#[test]
fn failing_oracle_degrades_but_still_optimizes() {
    let optimizer = ContextOptimizer::new().with_embedder(Arc::new(FailingOracle));
    let (out, report) = optimizer.optimize(notes(), "rank fusion", &OptimizationBudget::default());
    assert!(report.degraded_scoring);
    assert!(!out.is_empty());
    assert_eq!(report.output_items, out.len());
}

#[test]
fn late_oracle_results_are_discarded() {
    let optimizer = ContextOptimizer::new().with_embedder(Arc::new(SlowOracle(HashingEmbedder::new(64))));
    let budget = OptimizationBudget {
        oracle_timeout_ms: Some(5),
        ..Default::default()
    };
    let (_, report) = optimizer.optimize(notes(), "rank fusion", &budget);
    assert!(report.degraded_scoring);

    let (_, relaxed) = optimizer.optimize(notes(), "rank fusion", &OptimizationBudget::default());
    assert!(!relaxed.degraded_scoring);
}

#[test]
fn reordered_words_are_near_duplicates_with_an_embedder() {
    let optimizer = ContextOptimizer::new().with_embedder(Arc::new(HashingEmbedder::new(256)));
    let items = vec![
        ContextItem::new("x", "reciprocal rank fusion combines ranked lists", "vector"),
        ContextItem::new("y", "ranked lists combines reciprocal rank fusion", "lexical"),
    ];
    let budget = OptimizationBudget {
        min_retention: 1,
        relevance_threshold: 0.0,
        ..Default::default()
    };
    let (out, report) = optimizer.optimize(items, "rank fusion", &budget);
    assert_eq!(ids(&out), vec!["x"]);
    assert_eq!(report.duplicates.exact_removed, 0);
    assert_eq!(report.duplicates.near_removed, 1);
}

#[test]
fn report_tracks_tokens_and_reduction() {
    let budget = OptimizationBudget {
        max_total_tokens: 20,
        min_useful_tokens: 200,
        ..Default::default()
    };
    let items = notes();
    let input_tokens = total_tokens(&items, budget.chars_per_token);
    let (out, report) = ContextOptimizer::new().optimize(items, "rank fusion origins", &budget);

    assert_eq!(report.input_items, 4);
    assert_eq!(report.input_tokens, input_tokens);
    assert_eq!(report.output_tokens, total_tokens(&out, budget.chars_per_token));
    assert!(report.output_tokens <= 20);
    let expected = 100.0 * (1.0 - report.output_tokens as f64 / input_tokens as f64);
    assert!((report.reduction_pct - expected).abs() < 1e-9);
}

#[test]
fn identical_calls_give_identical_results() {
    let optimizer = ContextOptimizer::new().with_embedder(Arc::new(HashingEmbedder::new(128)));
    let budget = OptimizationBudget::aggressive();
    let first = optimizer.optimize(notes(), "rank fusion", &budget);
    let second = optimizer.optimize(notes(), "rank fusion", &budget);
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
}

#[test]
fn empty_input_is_a_valid_empty_output() {
    let (out, report) = ContextOptimizer::new().optimize(Vec::new(), "anything", &OptimizationBudget::default());
    assert!(out.is_empty());
    assert_eq!(report.input_tokens, 0);
    assert_eq!(report.reduction_pct, 0.0);
}

#[test]
fn optimizer_is_shareable_across_threads() {
    let optimizer = Arc::new(ContextOptimizer::new().with_embedder(Arc::new(HashingEmbedder::new(64))));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let optimizer = Arc::clone(&optimizer);
            std::thread::spawn(move || {
                optimizer
                    .optimize(notes(), "rank fusion", &OptimizationBudget::default())
                    .0
            })
        })
        .collect();
    let results: Vec<Vec<ContextItem>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn truncation_never_recreates_a_kept_item() {
    let items = vec![
        ContextItem::new("a", "Shards rebalance at night.", "vector"),
        ContextItem::new(
            "b",
            "Shards rebalance at night. Replicas catch up within minutes afterwards, quietly.",
            "lexical",
        ),
    ];
    let budget = OptimizationBudget {
        max_total_tokens: 20,
        min_useful_tokens: 5,
        ..Default::default()
    };

    for optimizer in [
        ContextOptimizer::new().with_scorer(Arc::new(PerfectScorer)),
        ContextOptimizer::new()
            .with_scorer(Arc::new(PerfectScorer))
            .with_embedder(Arc::new(HashingEmbedder::new(64))),
    ] {
        let (once, report) = optimizer.optimize(items.clone(), "shards rebalance", &budget);
        assert_eq!(ids(&once), vec!["a"]);
        assert_eq!(report.budget.truncated, 0);
        assert_eq!(report.budget.dropped, 1);

        let (twice, again) = optimizer.optimize(once.clone(), "shards rebalance", &budget);
        assert_eq!(again.duplicates.exact_removed, 0);
        assert_eq!(again.duplicates.near_removed, 0);
        assert_eq!(ids(&twice), ids(&once));
    }
}
