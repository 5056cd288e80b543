//! Token estimation and term-overlap heuristics.

use std::collections::BTreeSet;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have", "how",
    "in", "is", "it", "its", "of", "on", "or", "that", "the", "this", "to", "was", "were", "what",
    "when", "where", "which", "who", "why", "will", "with",
];

/// Estimated tokens: `ceil(chars / chars_per_token)`.
pub fn estimate_tokens(text: &str, chars_per_token: usize) -> usize {
    text.chars().count().div_ceil(chars_per_token.max(1))
}

/// Lowercase alphanumeric words, minus stopwords.
pub fn terms(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Jaccard similarity of two term sets; 0 when either is empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    shared as f64 / (a.len() + b.len() - shared) as f64
}

/// Fraction of query terms present in `text_terms`.
pub fn query_coverage(query_terms: &BTreeSet<String>, text_terms: &BTreeSet<String>) -> f64 {
    if query_terms.is_empty() {
        return 0.0;
    }
    query_terms.intersection(text_terms).count() as f64 / query_terms.len() as f64
}
