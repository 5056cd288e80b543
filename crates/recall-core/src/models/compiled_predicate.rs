use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Dialect-specific output of filter compilation. Immutable and short-lived:
/// built once per search and handed to every origin that speaks its dialect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dialect", rename_all = "snake_case")]
pub enum CompiledPredicate {
    /// SQL boolean fragment with positional `$n` placeholders bound to `params` in order.
    Relational { text: String, params: Vec<Value> },
    /// Tag-index query string.
    TagIndex { query_string: String },
}

impl CompiledPredicate {
    /// The predicate text (SQL fragment or tag query).
    pub fn text(&self) -> &str {
        match self {
            Self::Relational { text, .. } => text,
            Self::TagIndex { query_string } => query_string,
        }
    }

    /// Bound parameters (empty for the tag dialect).
    pub fn params(&self) -> &[Value] {
        match self {
            Self::Relational { params, .. } => params,
            Self::TagIndex { .. } => &[],
        }
    }
}
