use std::sync::Arc;

use recall_core::errors::RecallResult;
use recall_core::models::CompiledPredicate;
use recall_core::traits::ITagIndexBackend;
use recall_filter::Dialect;

use super::SearchOrigin;

/// Queries a tag index (cache) with one RediSearch query string.
pub struct TagIndexOrigin {
    name: String,
    backend: Arc<dyn ITagIndexBackend>,
}

impl TagIndexOrigin {
    pub fn new(backend: Arc<dyn ITagIndexBackend>) -> Self {
        Self {
            name: "tag_index".to_string(),
            backend,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Combine the compiled predicate with the query's words.
///
/// Words become a full-text disjunction `(w1|w2)`; the predicate, when
/// present, is parenthesized and intersected with it. With neither, the query matches all.
pub fn tag_query(query: &str, predicate: Option<&CompiledPredicate>) -> String {
    let words: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    let text = match words.len() {
        0 => None,
        1 => Some(words[0].clone()),
        _ => Some(format!("({})", words.join("|"))),
    };
    let filter = predicate
        .map(CompiledPredicate::text)
        .filter(|f| *f != "*");

    match (filter, text) {
        (Some(f), Some(t)) => format!("({f}) {t}"),
        (Some(f), None) => f.to_string(),
        (None, Some(t)) => t,
        (None, None) => "*".to_string(),
    }
}

impl SearchOrigin for TagIndexOrigin {
    fn name(&self) -> &str {
        &self.name
    }

    fn dialect(&self) -> Dialect {
        Dialect::TagIndex
    }

    fn search(
        &self,
        query: &str,
        predicate: Option<&CompiledPredicate>,
        limit: usize,
    ) -> RecallResult<Vec<(String, f64)>> {
        self.backend.search(&tag_query(query, predicate), limit)
    }
}
