//! The five optimizer stages, in pipeline order.

pub(crate) mod compression;
pub(crate) mod dedup;
pub(crate) mod low_information;
pub(crate) mod relevance;
pub(crate) mod token_budget;

use std::collections::BTreeSet;

use recall_core::models::ContextItem;
use recall_embeddings::cosine_similarity;

use crate::text::{jaccard, terms};

/// How item-to-item similarity is measured for the rest of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Similarity {
    /// Cosine of the items' embeddings.
    Embeddings,
    /// Jaccard overlap of term sets.
    Terms,
}

/// Per-item features for whichever similarity is in use.
pub(crate) enum Features<'a> {
    Vectors(Vec<&'a [f32]>),
    Terms(Vec<BTreeSet<String>>),
}

impl Features<'_> {
    pub(crate) fn similarity(&self, a: usize, b: usize) -> f64 {
        match self {
            Features::Vectors(v) => cosine_similarity(v[a], v[b]),
            Features::Terms(t) => jaccard(&t[a], &t[b]),
        }
    }
}

pub(crate) fn term_sets<'t>(texts: impl IntoIterator<Item = &'t str>) -> Vec<BTreeSet<String>> {
    texts.into_iter().map(terms).collect()
}

/// Features for `items` under `similarity`. Items without an embedding get an
/// empty vector, which is similar to nothing.
pub(crate) fn features(items: &[ContextItem], similarity: Similarity) -> Features<'_> {
    match similarity {
        Similarity::Embeddings => Features::Vectors(
            items
                .iter()
                .map(|item| item.embedding.as_deref().unwrap_or(&[]))
                .collect(),
        ),
        Similarity::Terms => Features::Terms(term_sets(items.iter().map(|i| i.text.as_str()))),
    }
}
