use crate::errors::RecallResult;
use crate::models::CompiledPredicate;

/// Vector-similarity index. Returns `(id, similarity ∈ [0, 1])` ordered by similarity descending.
pub trait IVectorBackend: Send + Sync {
    fn search(
        &self,
        embedding: &[f32],
        predicate: Option<&CompiledPredicate>,
        limit: usize,
    ) -> RecallResult<Vec<(String, f64)>>;
}

/// Lexical/term index. Returns `(id, score ≥ 0)` ordered by score descending.
pub trait ILexicalBackend: Send + Sync {
    fn search(
        &self,
        query: &str,
        predicate: Option<&CompiledPredicate>,
        limit: usize,
    ) -> RecallResult<Vec<(String, f64)>>;
}

/// Cache / tag index queried with a tag-dialect query string.
pub trait ITagIndexBackend: Send + Sync {
    fn search(&self, tag_query: &str, limit: usize) -> RecallResult<Vec<(String, f64)>>;
}
