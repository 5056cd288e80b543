//! Stage 5: fit the surviving items into the token budget.
//!
//! Items are taken in order. An item whose origin already has
//! `max_per_source` items is skipped. The first item that does not fit is
//! truncated when enough budget remains to be useful; either way filling stops
//! there. A truncated text is held to the same rules as a compressed one: it
//! must survive stages 1 and 2 unchanged next to the items already kept.

use std::collections::BTreeMap;

use recall_core::config::OptimizationBudget;
use recall_core::models::{BudgetStageCounts, ContextItem};
use recall_embeddings::cosine_similarity;
use tracing::debug;

use super::{dedup, low_information, Similarity};
use crate::oracle::Oracle;
use crate::text::clauses::TERMINATORS;
use crate::text::{content_hash, estimate_tokens, jaccard, join_clauses, split_clauses, terms};

const STAGE: &str = "token_budget";

/// Byte offset just past the last sentence terminator within the first
/// `max_chars` characters.
fn last_sentence_end(text: &str, max_chars: usize) -> Option<usize> {
    let chars: Vec<(usize, char)> = text.char_indices().take(max_chars + 1).collect();
    let mut last = None;
    for (k, &(i, c)) in chars.iter().enumerate().take(max_chars) {
        let followed_by_space = chars.get(k + 1).map_or(true, |&(_, next)| next.is_whitespace());
        if TERMINATORS.contains(&c) && followed_by_space {
            last = Some(i + c.len_utf8());
        }
    }
    last
}

/// Cut `text` to at most `max_chars` characters, at a sentence boundary when
/// that leaves at least `min_length` characters, otherwise mid-sentence.
pub(crate) fn truncate(text: &str, max_chars: usize, budget: &OptimizationBudget) -> Option<String> {
    let at_sentence = last_sentence_end(text, max_chars)
        .map(|end| text[..end].trim_end())
        .filter(|cut| cut.chars().count() >= budget.min_length);
    let cut = match at_sentence {
        Some(cut) => cut,
        None => {
            let end = text.char_indices().nth(max_chars).map_or(text.len(), |(i, _)| i);
            text[..end].trim_end()
        }
    };
    low_information::check(cut, budget).ok()?;
    Some(cut.to_string())
}

/// A cut of `text` that fits `max_chars` and that dedup would leave alone:
/// no repeated clause inside it, no exact or near copy among `kept`.
/// Returns the text, the clauses dropped from it, and its embedding when
/// embeddings are in use.
fn guarded_truncate(
    text: &str,
    max_chars: usize,
    kept: &[ContextItem],
    budget: &OptimizationBudget,
    similarity: Similarity,
    oracle: &mut Oracle<'_>,
) -> Option<(String, usize, Option<Vec<f32>>)> {
    let mut cut = truncate(text, max_chars, budget)?;

    let clauses = split_clauses(&cut);
    let mut clauses_removed = 0;
    if clauses.len() > 1 {
        let texts: Vec<String> = clauses.iter().map(|c| c.text.clone()).collect();
        let vectors = oracle.embed_batch(STAGE, &texts);
        let distinct = dedup::distinct_clauses(&clauses, vectors.as_deref(), budget.clause_dup_threshold);
        if distinct.len() < clauses.len() {
            clauses_removed = clauses.len() - distinct.len();
            cut = join_clauses(distinct.iter().map(|&i| &clauses[i]));
            low_information::check(&cut, budget).ok()?;
        }
    }

    let hash = content_hash(&cut);
    if kept.iter().any(|k| content_hash(&k.text) == hash) {
        return None;
    }

    let vector = match similarity {
        Similarity::Embeddings => {
            // Without a vector the cut cannot be shown distinct.
            let vector = oracle.embed_batch(STAGE, std::slice::from_ref(&cut))?.pop()?;
            let near = kept.iter().any(|k| {
                cosine_similarity(&vector, k.embedding.as_deref().unwrap_or(&[])) >= budget.item_dup_threshold
            });
            if near {
                return None;
            }
            Some(vector)
        }
        Similarity::Terms => {
            let cut_terms = terms(&cut);
            if kept
                .iter()
                .any(|k| jaccard(&cut_terms, &terms(&k.text)) >= budget.item_dup_threshold)
            {
                return None;
            }
            None
        }
    };
    Some((cut, clauses_removed, vector))
}

pub(crate) fn fit(
    items: Vec<ContextItem>,
    budget: &OptimizationBudget,
    similarity: Similarity,
    oracle: &mut Oracle<'_>,
    counts: &mut BudgetStageCounts,
) -> Vec<ContextItem> {
    let chars_per_token = budget.chars_per_token.max(1);
    let mut kept = Vec::with_capacity(items.len());
    let mut used = 0usize;
    let mut per_source: BTreeMap<String, usize> = BTreeMap::new();

    let mut remaining_items = items.into_iter();
    for mut item in remaining_items.by_ref() {
        let taken = per_source.get(&item.origin).copied().unwrap_or(0);
        if taken >= budget.max_per_source {
            counts.per_source_skipped += 1;
            continue;
        }

        let tokens = estimate_tokens(&item.text, chars_per_token);
        if used + tokens <= budget.max_total_tokens {
            used += tokens;
            *per_source.entry(item.origin.clone()).or_default() += 1;
            kept.push(item);
            continue;
        }

        let remaining = budget.max_total_tokens - used;
        let truncated = if remaining > budget.min_useful_tokens {
            guarded_truncate(
                &item.text,
                remaining * chars_per_token,
                &kept,
                budget,
                similarity,
                oracle,
            )
        } else {
            None
        };
        match truncated {
            Some((text, clauses_removed, vector)) => {
                item.rewrite(text);
                item.embedding = vector;
                item.flags.clauses_removed += clauses_removed;
                item.flags.truncated = true;
                counts.truncated += 1;
                kept.push(item);
            }
            None => counts.dropped += 1,
        }
        break;
    }
    counts.dropped += remaining_items.count();

    debug!(
        kept = kept.len(),
        used_tokens = used,
        dropped = counts.dropped,
        truncated = counts.truncated,
        "budget fit done"
    );
    kept
}
