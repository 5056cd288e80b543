use std::sync::Arc;

use recall_core::errors::RecallResult;
use recall_core::models::CompiledPredicate;
use recall_core::traits::ILexicalBackend;
use recall_filter::Dialect;

use super::SearchOrigin;

/// Passes the raw query to a term index.
pub struct LexicalOrigin {
    name: String,
    backend: Arc<dyn ILexicalBackend>,
}

impl LexicalOrigin {
    pub fn new(backend: Arc<dyn ILexicalBackend>) -> Self {
        Self {
            name: "lexical".to_string(),
            backend,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl SearchOrigin for LexicalOrigin {
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
        self.backend.search(query, predicate, limit)
    }
}
