//! Dotted field paths (`metadata.department`) and record key flattening.

use std::collections::BTreeSet;

use serde_json::Value;

use recall_core::errors::{FilterError, FilterResult};

/// A validated dotted path. Every segment is an identifier
/// (`[A-Za-z_][A-Za-z0-9_]*`), so segments can be spliced into backend
/// query text without quoting hazards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(path: &str) -> FilterResult<Self> {
        if path.is_empty() {
            return Err(malformed(path, "path is empty"));
        }
        let mut segments = Vec::new();
        for segment in path.split('.') {
            if segment.is_empty() {
                return Err(malformed(path, "empty segment"));
            }
            let mut chars = segment.chars();
            let first_ok = chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
            if !first_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(malformed(
                    path,
                    &format!("segment '{segment}' is not an identifier"),
                ));
            }
            segments.push(segment.to_string());
        }
        Ok(Self {
            raw: path.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }

    /// Walk nested objects. `None` when any step is missing or not an object.
    /// A present JSON `null` resolves to `Some(&Value::Null)`.
    pub fn resolve<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        let mut current = record;
        for segment in &self.segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}

fn malformed(path: &str, reason: &str) -> FilterError {
    FilterError::MalformedPath {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

/// Every dotted key path present in `record`: leaves and intermediate objects
/// alike, regardless of value.
///
/// Top-level keys are columns, and a column holding `null` is absent. Below
/// the top level a key holding `null` is present, as in a JSON document.
pub fn flatten_keys(record: &Value) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    if let Some(map) = record.as_object() {
        for (key, value) in map.iter().filter(|(_, v)| !v.is_null()) {
            collect(key.clone(), value, &mut keys);
        }
    }
    keys
}

fn collect(prefix: String, value: &Value, keys: &mut BTreeSet<String>) {
    if let Some(map) = value.as_object() {
        for (key, child) in map {
            collect(format!("{prefix}.{key}"), child, keys);
        }
    }
    keys.insert(prefix);
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_nested_path() {
        let path = FieldPath::parse("metadata.department").unwrap();
        assert_eq!(path.segments(), ["metadata", "department"]);
        assert!(path.is_nested());
    }

    #[test]
    fn rejects_malformed_paths() {
        for bad in ["", ".a", "a.", "a..b", "a.b-c", "1abc", "a b", "a.'b"] {
            assert!(
                matches!(
                    FieldPath::parse(bad),
                    Err(FilterError::MalformedPath { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn resolves_arbitrary_depth() {
        let record = json!({"a": {"b": {"c": {"d": 7}}}});
        let path = FieldPath::parse("a.b.c.d").unwrap();
        assert_eq!(path.resolve(&record), Some(&json!(7)));
        assert_eq!(FieldPath::parse("a.x").unwrap().resolve(&record), None);
    }

    #[test]
    fn resolve_stops_at_non_objects() {
        let record = json!({"tags": ["x", "y"], "n": null});
        assert_eq!(FieldPath::parse("tags.x").unwrap().resolve(&record), None);
        assert_eq!(
            FieldPath::parse("n").unwrap().resolve(&record),
            Some(&Value::Null)
        );
    }

    #[test]
    fn flatten_includes_intermediate_and_nested_null_keys() {
        let record = json!({"metadata": {"department": "eng", "owner": null}, "score": 1, "team": null});
        let keys: Vec<String> = flatten_keys(&record).into_iter().collect();
        assert_eq!(
            keys,
            vec![
                "metadata",
                "metadata.department",
                "metadata.owner",
                "score"
            ]
        );
    }
}
