use std::sync::Arc;

use recall_core::errors::RecallResult;
use recall_core::models::CompiledPredicate;
use recall_core::traits::{IEmbeddingProvider, IVectorBackend};
use recall_filter::Dialect;

use super::SearchOrigin;

/// Embeds the query and asks the vector backend for its nearest neighbours.
pub struct VectorOrigin {
    name: String,
    backend: Arc<dyn IVectorBackend>,
    embedder: Arc<dyn IEmbeddingProvider>,
}

impl VectorOrigin {
    pub fn new(backend: Arc<dyn IVectorBackend>, embedder: Arc<dyn IEmbeddingProvider>) -> Self {
        Self {
            name: "vector".to_string(),
            backend,
            embedder,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl SearchOrigin for VectorOrigin {
    fn name(&self) -> &str {
        &self.name
    }

    fn dialect(&self) -> Dialect {
        Dialect::Relational
    }

    fn search(
        &self,
        query: &str,
        predicate: Option<&CompiledPredicate>,
        limit: usize,
    ) -> RecallResult<Vec<(String, f64)>> {
        let embedding = self.embedder.embed(query)?;
        self.backend.search(&embedding, predicate, limit)
    }
}
