//! Stage 1: clause-level, exact, and near-duplicate removal.

use std::collections::HashSet;

use rayon::prelude::*;
use recall_core::models::{ContextItem, DedupStageCounts};
use recall_embeddings::cosine_similarity;
use tracing::debug;

use super::{features, term_sets, Similarity};
use crate::oracle::Oracle;
use crate::text::{content_hash, jaccard, join_clauses, normalize, split_clauses, Clause};

const CLAUSE_STAGE: &str = "clause_dedup";
const NEAR_STAGE: &str = "near_dedup";

/// Normalized clause with a leading conjunction dropped, so "and X" matches "X".
fn normalize_clause(text: &str) -> String {
    let normalized = normalize(text);
    for conjunction in ["and ", "or ", "but "] {
        if let Some(rest) = normalized.strip_prefix(conjunction) {
            return rest.to_string();
        }
    }
    normalized
}

/// Indices of the clauses that survive, in order. A clause is dropped when it
/// matches an earlier kept clause exactly or at `threshold` similarity.
pub(crate) fn distinct_clauses(clauses: &[Clause], vectors: Option<&[Vec<f32>]>, threshold: f64) -> Vec<usize> {
    let normalized: Vec<String> = clauses.iter().map(|c| normalize_clause(&c.text)).collect();
    let terms = vectors
        .is_none()
        .then(|| term_sets(clauses.iter().map(|c| c.text.as_str())));

    let mut kept: Vec<usize> = Vec::with_capacity(clauses.len());
    for i in 0..clauses.len() {
        let duplicate = !normalized[i].is_empty()
            && kept.iter().any(|&k| {
                normalized[k] == normalized[i]
                    || match (vectors, &terms) {
                        (Some(v), _) => cosine_similarity(&v[k], &v[i]) >= threshold,
                        (None, Some(t)) => jaccard(&t[k], &t[i]) >= threshold,
                        (None, None) => false,
                    }
            });
        if !duplicate {
            kept.push(i);
        }
    }
    kept
}

/// 1a. Drop repeated clauses inside each item. All clauses of all
/// multi-clause items are embedded in one batch.
pub(crate) fn remove_duplicate_clauses(
    items: &mut [ContextItem],
    threshold: f64,
    oracle: &mut Oracle<'_>,
    counts: &mut DedupStageCounts,
) {
    let split: Vec<Vec<Clause>> = items.par_iter().map(|i| split_clauses(&i.text)).collect();
    let texts: Vec<String> = split
        .iter()
        .filter(|clauses| clauses.len() > 1)
        .flat_map(|clauses| clauses.iter().map(|c| c.text.clone()))
        .collect();
    if texts.is_empty() {
        return;
    }
    let vectors = oracle.embed_batch(CLAUSE_STAGE, &texts);

    let mut offset = 0;
    for (item, clauses) in items.iter_mut().zip(&split) {
        if clauses.len() < 2 {
            continue;
        }
        let item_vectors = vectors
            .as_deref()
            .map(|v| &v[offset..offset + clauses.len()]);
        offset += clauses.len();

        let kept = distinct_clauses(clauses, item_vectors, threshold);
        let removed = clauses.len() - kept.len();
        if removed == 0 {
            continue;
        }
        item.rewrite(join_clauses(kept.iter().map(|&i| &clauses[i])));
        item.flags.clauses_removed += removed;
        counts.clauses_removed += removed;
        counts.items_changed += 1;
    }
    debug!(
        clauses_removed = counts.clauses_removed,
        items_changed = counts.items_changed,
        "clause dedup done"
    );
}

/// 1b. Keep the first item per normalized-text hash.
pub(crate) fn remove_exact_duplicates(
    items: Vec<ContextItem>,
    counts: &mut DedupStageCounts,
) -> Vec<ContextItem> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| {
            let fresh = seen.insert(content_hash(&item.text));
            if !fresh {
                counts.exact_removed += 1;
            }
            fresh
        })
        .collect()
}

/// Fill in missing embeddings with one oracle call. Returns the similarity
/// measure the rest of the run should use.
pub(crate) fn ensure_embeddings(
    items: &mut [ContextItem],
    oracle: &mut Oracle<'_>,
    stage: &str,
) -> Similarity {
    let missing: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.embedding.is_none())
        .map(|(i, _)| i)
        .collect();
    if missing.is_empty() {
        return Similarity::Embeddings;
    }
    let texts: Vec<String> = missing.iter().map(|&i| items[i].text.clone()).collect();
    match oracle.embed_batch(stage, &texts) {
        Some(vectors) => {
            for (i, vector) in missing.into_iter().zip(vectors) {
                items[i].embedding = Some(vector);
            }
            Similarity::Embeddings
        }
        None => Similarity::Terms,
    }
}

/// 1c. Drop items at `threshold` similarity to an earlier kept item.
pub(crate) fn remove_near_duplicates(
    mut items: Vec<ContextItem>,
    threshold: f64,
    oracle: &mut Oracle<'_>,
    counts: &mut DedupStageCounts,
) -> (Vec<ContextItem>, Similarity) {
    let similarity = ensure_embeddings(&mut items, oracle, NEAR_STAGE);

    let keep: Vec<bool> = {
        let features = features(&items, similarity);
        let mut kept: Vec<usize> = Vec::with_capacity(items.len());
        (0..items.len())
            .map(|i| {
                let duplicate = kept.iter().any(|&k| features.similarity(k, i) >= threshold);
                if !duplicate {
                    kept.push(i);
                }
                !duplicate
            })
            .collect()
    };
    counts.near_removed += keep.iter().filter(|k| !**k).count();

    let items = items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, keep)| keep.then_some(item))
        .collect();
    (items, similarity)
}
