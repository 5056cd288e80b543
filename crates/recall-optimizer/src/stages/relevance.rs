//! Stage 4: iterative relevance verification.
//!
//! Scores come from the injected scorer when there is one, then from
//! embedding cosine against the query, then from query-term coverage. A
//! source that fails is not retried for the rest of the stage.

use std::collections::BTreeSet;

use rayon::prelude::*;
use recall_core::config::OptimizationBudget;
use recall_core::models::{ContextItem, RelevanceStageCounts};
use recall_core::traits::IRelevanceScorer;
use recall_embeddings::cosine_similarity;
use tracing::debug;

use crate::oracle::Oracle;
use crate::text::{query_coverage, terms};

const STAGE: &str = "relevance";

struct Scoring<'a, 'p> {
    query: &'a str,
    query_terms: BTreeSet<String>,
    query_vector: Option<Vec<f32>>,
    scorer: Option<&'a dyn IRelevanceScorer>,
    oracle: &'a mut Oracle<'p>,
    use_embeddings: bool,
}

impl Scoring<'_, '_> {
    fn score(&mut self, items: &mut [ContextItem]) -> Vec<f64> {
        if let Some(scorer) = self.scorer {
            let texts: Vec<String> = items.iter().map(|i| i.text.clone()).collect();
            match scorer.score(self.query, &texts) {
                Ok(scores) if scores.len() == texts.len() => return scores,
                Ok(scores) => self.oracle.degrade(
                    STAGE,
                    &format!(
                        "{} returned {} scores for {} items",
                        scorer.name(),
                        scores.len(),
                        texts.len()
                    ),
                ),
                Err(e) => self.oracle.degrade(STAGE, &format!("{}: {e}", scorer.name())),
            }
            self.scorer = None;
        }

        if self.use_embeddings {
            match self.embedding_scores(items) {
                Some(scores) => return scores,
                None => self.use_embeddings = false,
            }
        }

        items
            .par_iter()
            .map(|item| query_coverage(&self.query_terms, &terms(&item.text)))
            .collect()
    }

    /// Cosine against the query. The query and any items lacking an
    /// embedding go to the oracle in one batch.
    fn embedding_scores(&mut self, items: &mut [ContextItem]) -> Option<Vec<f64>> {
        let missing: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.embedding.is_none())
            .map(|(i, _)| i)
            .collect();
        let need_query = self.query_vector.is_none();

        let mut texts: Vec<String> = Vec::with_capacity(missing.len() + 1);
        if need_query {
            texts.push(self.query.to_string());
        }
        texts.extend(missing.iter().map(|&i| items[i].text.clone()));

        if !texts.is_empty() {
            let mut vectors = self.oracle.embed_batch(STAGE, &texts)?.into_iter();
            if need_query {
                self.query_vector = vectors.next();
            }
            for (i, vector) in missing.into_iter().zip(vectors) {
                items[i].embedding = Some(vector);
            }
        }

        let query_vector = self.query_vector.as_deref()?;
        Some(
            items
                .iter()
                .map(|item| cosine_similarity(query_vector, item.embedding.as_deref().unwrap_or(&[])))
                .collect(),
        )
    }
}

/// Indices of the `n` best scores, ties broken by position.
fn top_n(scores: &[f64], n: usize) -> BTreeSet<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    order.into_iter().take(n).collect()
}

pub(crate) fn verify(
    mut items: Vec<ContextItem>,
    query: &str,
    budget: &OptimizationBudget,
    scorer: Option<&dyn IRelevanceScorer>,
    oracle: &mut Oracle<'_>,
    counts: &mut RelevanceStageCounts,
) -> Vec<ContextItem> {
    if items.is_empty() {
        counts.converged = true;
        return items;
    }

    let use_embeddings = oracle.is_configured();
    let mut scoring = Scoring {
        query,
        query_terms: terms(query),
        query_vector: None,
        scorer,
        oracle,
        use_embeddings,
    };

    for _ in 0..budget.max_iterations.max(1) {
        let scores = scoring.score(&mut items);
        counts.iterations += 1;
        for (item, &score) in items.iter_mut().zip(&scores) {
            item.relevance_score = score;
        }

        let below = scores
            .iter()
            .filter(|&&s| s < budget.relevance_threshold)
            .count();
        if below == 0 {
            counts.converged = true;
            break;
        }

        let survivors = items.len() - below;
        if survivors < budget.min_retention && items.len() >= budget.min_retention {
            let top = top_n(&scores, budget.min_retention);
            counts.removed += items.len() - top.len();
            counts.retention_safeguard = true;
            items = items
                .into_iter()
                .enumerate()
                .filter_map(|(i, item)| top.contains(&i).then_some(item))
                .collect();
            break;
        }

        counts.removed += below;
        items = items
            .into_iter()
            .zip(scores)
            .filter_map(|(item, s)| (s >= budget.relevance_threshold).then_some(item))
            .collect();
        if items.is_empty() {
            counts.converged = true;
            break;
        }
    }

    debug!(
        removed = counts.removed,
        iterations = counts.iterations,
        converged = counts.converged,
        safeguard = counts.retention_safeguard,
        "relevance verification done"
    );
    items
}

#[cfg(test)]
mod tests {
    use recall_core::errors::{EmbeddingError, RecallResult};

    use super::*;

    struct Fixed(Vec<f64>);

    impl IRelevanceScorer for Fixed {
        fn score(&self, _query: &str, texts: &[String]) -> RecallResult<Vec<f64>> {
            Ok(self.0.iter().copied().take(texts.len()).collect())
        }
        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct Broken;

    impl IRelevanceScorer for Broken {
        fn score(&self, _query: &str, _texts: &[String]) -> RecallResult<Vec<f64>> {
            Err(EmbeddingError::InferenceFailed {
                reason: "scorer offline".to_string(),
            }
            .into())
        }
        fn name(&self) -> &str {
            "broken"
        }
    }

    fn items(n: usize) -> Vec<ContextItem> {
        (0..n)
            .map(|i| ContextItem::new(format!("i{i}"), format!("rank fusion note {i}"), "vector"))
            .collect()
    }

    #[test]
    fn drops_low_scores_then_converges() {
        let budget = OptimizationBudget {
            min_retention: 1,
            ..Default::default()
        };
        let scorer = Fixed(vec![0.9, 0.1, 0.8]);
        let mut counts = RelevanceStageCounts::default();
        let kept = verify(
            items(3),
            "rank fusion",
            &budget,
            Some(&scorer),
            &mut Oracle::new(None, None),
            &mut counts,
        );
        // The second pass scores the two survivors as [0.9, 0.1] again.
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "i0");
        assert_eq!(counts.iterations, 3);
        assert!(counts.converged);
    }

    #[test]
    fn safeguard_keeps_the_best_items_in_order() {
        let scorer = Fixed(vec![0.2, 0.5, 0.1, 0.4]);
        let mut counts = RelevanceStageCounts::default();
        let kept = verify(
            items(4),
            "q",
            &OptimizationBudget::default(),
            Some(&scorer),
            &mut Oracle::new(None, None),
            &mut counts,
        );
        let ids: Vec<&str> = kept.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["i0", "i1", "i3"]);
        assert!(counts.retention_safeguard);
        assert_eq!(counts.removed, 1);
        assert_eq!(counts.iterations, 1);
    }

    #[test]
    fn failing_scorer_falls_back_to_term_coverage() {
        let mut oracle = Oracle::new(None, None);
        let mut counts = RelevanceStageCounts::default();
        let kept = verify(
            items(2),
            "rank fusion",
            &OptimizationBudget::default(),
            Some(&Broken),
            &mut oracle,
            &mut counts,
        );
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|i| i.relevance_score == 1.0));
        assert!(oracle.degraded());
        assert!(counts.converged);
    }
}
