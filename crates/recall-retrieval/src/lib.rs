//! # recall-retrieval
//!
//! Hybrid retrieval over any number of ranked origins.
//!
//! - `origins`: adapters that turn a query and compiled filter into a ranked
//!   id list (vector, lexical, tag index).
//! - `search`: weighted Reciprocal Rank Fusion and the async `HybridSearcher`
//!   that fans out to origins under per-origin timeouts and cancellation.
//! - `engine`: `RetrievalEngine`, which materializes fused ids into records
//!   and hands them to the context optimizer.

pub mod engine;
pub mod origins;
pub mod search;

pub use engine::{RetrievalEngine, RetrievalOutcome};
pub use origins::{tag_query, LexicalOrigin, SearchOrigin, TagIndexOrigin, VectorOrigin};
pub use search::{fuse, HybridSearcher, HybridSearcherBuilder, SearchRequest, WeightedRanking};
