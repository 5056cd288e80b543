//! Stage 3: query-focused compression.
//!
//! An item is reduced to its query-relevant clauses only when that saves
//! enough text and the result would survive stages 1 and 2 unchanged: it
//! must pass the low-information check, collide with no other item's hash,
//! and stay below the near-duplicate threshold against every other item.

use std::collections::BTreeSet;

use rayon::prelude::*;
use recall_core::config::OptimizationBudget;
use recall_core::models::{CompressionStageCounts, ContextItem};
use recall_embeddings::cosine_similarity;
use tracing::debug;

use super::{low_information, term_sets, Similarity};
use crate::oracle::Oracle;
use crate::text::{content_hash, jaccard, join_clauses, split_clauses, terms, Clause};

const STAGE: &str = "compression";

/// The compressed text for one item, if compression is worthwhile.
fn candidate(text: &str, query_terms: &BTreeSet<String>, budget: &OptimizationBudget) -> Option<String> {
    let clauses = split_clauses(text);
    let selected: Vec<Clause> = clauses
        .iter()
        .filter(|c| !terms(&c.text).is_disjoint(query_terms))
        .take(budget.max_compressed_clauses)
        .map(|c| Clause {
            line: c.line,
            text: c.text.split_whitespace().collect::<Vec<_>>().join(" "),
        })
        .collect();
    if selected.is_empty() || selected.len() == clauses.len() {
        return None;
    }

    let compressed = join_clauses(&selected);
    let before = text.chars().count() as f64;
    let after = compressed.chars().count() as f64;
    if after > before * (1.0 - budget.min_compression_savings) {
        return None;
    }
    low_information::check(&compressed, budget).ok()?;
    Some(compressed)
}

pub(crate) fn compress(
    items: &mut [ContextItem],
    query: &str,
    budget: &OptimizationBudget,
    similarity: Similarity,
    oracle: &mut Oracle<'_>,
    counts: &mut CompressionStageCounts,
) {
    let query_terms = terms(query);
    if query_terms.is_empty() || budget.max_compressed_clauses == 0 {
        return;
    }

    let candidates: Vec<(usize, String)> = items
        .par_iter()
        .enumerate()
        .filter_map(|(i, item)| candidate(&item.text, &query_terms, budget).map(|c| (i, c)))
        .collect();
    if candidates.is_empty() {
        return;
    }

    let mut vectors: Vec<Option<Vec<f32>>> = match similarity {
        Similarity::Embeddings => {
            let texts: Vec<String> = candidates.iter().map(|(_, c)| c.clone()).collect();
            match oracle.embed_batch(STAGE, &texts) {
                Some(v) => v.into_iter().map(Some).collect(),
                // Cannot prove the results are not near-duplicates.
                None => return,
            }
        }
        Similarity::Terms => vec![None; candidates.len()],
    };

    let mut hashes: Vec<blake3::Hash> = items.iter().map(|i| content_hash(&i.text)).collect();
    let mut item_terms = match similarity {
        Similarity::Terms => term_sets(items.iter().map(|i| i.text.as_str())),
        Similarity::Embeddings => Vec::new(),
    };

    for ((idx, compressed), vector) in candidates.into_iter().zip(vectors.iter_mut()) {
        let hash = content_hash(&compressed);
        let collides = hashes
            .iter()
            .enumerate()
            .any(|(j, h)| j != idx && *h == hash);
        if collides {
            continue;
        }

        let compressed_terms = match similarity {
            Similarity::Terms => Some(terms(&compressed)),
            Similarity::Embeddings => None,
        };
        let near_duplicate = (0..items.len()).filter(|&j| j != idx).any(|j| {
            let score = match (vector.as_deref(), &compressed_terms) {
                (Some(v), _) => cosine_similarity(v, items[j].embedding.as_deref().unwrap_or(&[])),
                (None, Some(t)) => jaccard(t, &item_terms[j]),
                (None, None) => 0.0,
            };
            score >= budget.item_dup_threshold
        });
        if near_duplicate {
            continue;
        }

        let item = &mut items[idx];
        counts.chars_saved += item.text.chars().count() - compressed.chars().count();
        counts.compressed += 1;
        item.rewrite(compressed);
        item.embedding = vector.take();
        item.flags.compressed = true;
        hashes[idx] = hash;
        if let Some(t) = compressed_terms {
            item_terms[idx] = t;
        }
    }
    debug!(
        compressed = counts.compressed,
        chars_saved = counts.chars_saved,
        "compression done"
    );
}
