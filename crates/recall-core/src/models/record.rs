use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A full record as held by the record store.
///
/// `metadata` is the attribute map that filter expressions are evaluated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Value,
}

impl Record {
    pub fn new(id: impl Into<String>, text: impl Into<String>, metadata: Value) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata,
        }
    }
}
