//! Origin adapters: each wraps one backend behind a common call shape.

mod lexical;
mod tag_index;
mod vector;

pub use lexical::LexicalOrigin;
pub use tag_index::{tag_query, TagIndexOrigin};
pub use vector::VectorOrigin;

use recall_core::errors::RecallResult;
use recall_core::models::CompiledPredicate;
use recall_filter::Dialect;

/// One independently ranked source of candidates.
///
/// Calls are blocking; the searcher runs each on the blocking pool.
pub trait SearchOrigin: Send + Sync {
    /// Unique name; also the key for fusion weights and metrics.
    fn name(&self) -> &str;

    /// Dialect the filter must be compiled to for this origin.
    fn dialect(&self) -> Dialect;

    /// Ranked `(id, score)` pairs, best first.
    fn search(
        &self,
        query: &str,
        predicate: Option<&CompiledPredicate>,
        limit: usize,
    ) -> RecallResult<Vec<(String, f64)>>;
}
