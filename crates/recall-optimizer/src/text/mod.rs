//! Text utilities shared by the optimizer stages.

pub mod clauses;
pub mod entropy;
pub mod tokens;

pub use clauses::{join_clauses, split_clauses, Clause};
pub use entropy::normalized_entropy;
pub use tokens::{estimate_tokens, jaccard, query_coverage, terms};

/// Lowercase, replace punctuation with spaces, collapse whitespace.
pub fn normalize(text: &str) -> String {
    let mapped: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    mapped
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// blake3 digest of the normalized text.
pub fn content_hash(text: &str) -> blake3::Hash {
    blake3::hash(normalize(text).as_bytes())
}
