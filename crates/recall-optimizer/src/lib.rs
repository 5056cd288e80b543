//! # recall-optimizer
//!
//! Reduces a retrieved candidate set to a token budget.
//!
//! ## Pipeline
//!
//! ```text
//! 1. dedup            clause repeats, exact duplicates, near-duplicates
//! 2. low information  too short or low character entropy
//! 3. compression      keep query-relevant clauses
//! 4. relevance        iterative verification with a retention floor
//! 5. token budget     per-source caps, greedy fill, truncation
//! ```
//!
//! The embedding oracle and relevance scorer are optional. When either
//! fails or misses its deadline, the affected stage falls back to term
//! overlap and the report is marked degraded.

pub mod engine;
mod oracle;
mod stages;
pub mod text;

pub use engine::{total_tokens, ContextOptimizer};
