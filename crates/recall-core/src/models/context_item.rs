use serde::{Deserialize, Serialize};

/// Markers set by optimizer stages that rewrote an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFlags {
    pub compressed: bool,
    pub truncated: bool,
    pub clauses_removed: usize,
}

/// A unit of retrieved context flowing through the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextItem {
    pub id: String,
    pub text: String,
    /// Origin tag (e.g. "vector", "lexical"); used for per-source caps.
    pub origin: String,
    /// Embedding of `text`. Cleared whenever a stage rewrites the text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    pub relevance_score: f64,
    #[serde(default)]
    pub flags: ItemFlags,
}

impl ContextItem {
    pub fn new(id: impl Into<String>, text: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            origin: origin.into(),
            embedding: None,
            relevance_score: 0.0,
            flags: ItemFlags::default(),
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_relevance(mut self, relevance_score: f64) -> Self {
        self.relevance_score = relevance_score;
        self
    }

    /// Replace the text and drop the now-stale embedding.
    pub fn rewrite(&mut self, text: String) {
        self.text = text;
        self.embedding = None;
    }
}
