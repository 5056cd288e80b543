//! RediSearch query strings.
//!
//! Strings and booleans map to TAG fields (`@f:{v}`), numbers to NUMERIC
//! fields (`@f:[lo hi]`). Constructs without a faithful equivalent are
//! rejected rather than approximated.

use serde_json::Value;

use recall_core::errors::{FilterError, FilterResult};

use crate::expression::{Condition, FilterExpression, GroupLogic, Operand};
use crate::operator::FilterOperator;
use crate::path::FieldPath;

const DIALECT: &str = "tag_index";

/// A compiled fragment. `All` matches every document and has no
/// standalone syntax inside a larger query, so it is folded away.
enum Fragment {
    All,
    Query(String),
}

pub(super) fn compile(expr: &FilterExpression) -> FilterResult<String> {
    Ok(match fragment(expr)? {
        Fragment::All => "*".to_string(),
        Fragment::Query(query) => query,
    })
}

fn fragment(expr: &FilterExpression) -> FilterResult<Fragment> {
    match expr {
        FilterExpression::Condition(condition) => condition_query(condition).map(Fragment::Query),
        FilterExpression::Group { logic, children } => {
            let parts = children
                .iter()
                .map(fragment)
                .collect::<FilterResult<Vec<_>>>()?;
            match logic {
                GroupLogic::And => {
                    let queries: Vec<String> = parts
                        .into_iter()
                        .filter_map(|part| match part {
                            Fragment::All => None,
                            Fragment::Query(query) => Some(query),
                        })
                        .collect();
                    Ok(if queries.is_empty() {
                        Fragment::All
                    } else {
                        Fragment::Query(format!("({})", queries.join(" ")))
                    })
                }
                GroupLogic::Or => {
                    if parts.is_empty() {
                        return Err(unsupported("empty OR group matches nothing"));
                    }
                    Ok(disjunction(parts).map_or(Fragment::All, Fragment::Query))
                }
                GroupLogic::Not => {
                    if parts.is_empty() {
                        return Ok(Fragment::All);
                    }
                    match disjunction(parts) {
                        Some(query) => Ok(Fragment::Query(format!("-{query}"))),
                        None => Err(unsupported("NOT over a match-all child matches nothing")),
                    }
                }
            }
        }
    }
}

/// `(a | b)`, or `None` when some child matches everything.
fn disjunction(parts: Vec<Fragment>) -> Option<String> {
    let mut queries = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            Fragment::All => return None,
            Fragment::Query(query) => queries.push(query),
        }
    }
    Some(format!("({})", queries.join(" | ")))
}

fn condition_query(condition: &Condition) -> FilterResult<String> {
    let path = FieldPath::parse(&condition.field)?;
    let field = format!("@{}", path.segments().join("__"));

    match condition.operator {
        FilterOperator::Exists | FilterOperator::IsNotNull => {
            return Ok(format!("-ismissing({field})"))
        }
        FilterOperator::NotExists | FilterOperator::IsNull => {
            return Ok(format!("ismissing({field})"))
        }
        _ => {}
    }

    match condition.operator.negates() {
        Some(positive) => Ok(format!("-({})", positive_query(positive, condition, &field)?)),
        None => positive_query(condition.operator, condition, &field),
    }
}

fn positive_query(operator: FilterOperator, condition: &Condition, field: &str) -> FilterResult<String> {
    match (operator, &condition.operand) {
        (FilterOperator::Eq, Operand::Scalar(value)) => equals(field, value),
        (FilterOperator::Gt, Operand::Scalar(value)) => {
            Ok(format!("{field}:[({} +inf]", number(value)?))
        }
        (FilterOperator::Gte, Operand::Scalar(value)) => {
            Ok(format!("{field}:[{} +inf]", number(value)?))
        }
        (FilterOperator::Lt, Operand::Scalar(value)) => {
            Ok(format!("{field}:[-inf ({}]", number(value)?))
        }
        (FilterOperator::Lte, Operand::Scalar(value)) => {
            Ok(format!("{field}:[-inf {}]", number(value)?))
        }
        (FilterOperator::Between, Operand::Pair(low, high)) => {
            Ok(format!("{field}:[{} {}]", number(low)?, number(high)?))
        }
        (FilterOperator::Regex, _) => Err(unsupported("REGEX has no tag-index equivalent")),
        (
            FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith,
            Operand::Scalar(Value::String(needle)),
        ) => {
            if !condition.case_sensitive {
                return Err(unsupported(
                    "case-insensitive matching on case-sensitive tag fields",
                ));
            }
            let needle = escape_tag(needle);
            Ok(match operator {
                FilterOperator::StartsWith => format!("{field}:{{{needle}*}}"),
                FilterOperator::EndsWith => format!("{field}:{{*{needle}}}"),
                _ => format!("{field}:{{*{needle}*}}"),
            })
        }
        (FilterOperator::In | FilterOperator::AnyOf, Operand::List(items)) => any_of(field, items),
        (FilterOperator::AllOf, Operand::List(items)) => {
            if items.is_empty() {
                return Err(unsupported("ALL_OF with an empty list"));
            }
            let parts = items
                .iter()
                .map(|item| equals(field, item))
                .collect::<FilterResult<Vec<_>>>()?;
            Ok(format!("({})", parts.join(" ")))
        }
        _ => Err(FilterError::InvalidOperand {
            field: condition.field.clone(),
            operator: operator.to_string(),
            expected: "an operand matching the operator".to_string(),
        }),
    }
}

fn equals(field: &str, value: &Value) -> FilterResult<String> {
    match value {
        Value::Number(n) => Ok(format!("{field}:[{n} {n}]")),
        Value::String(s) => Ok(format!("{field}:{{{}}}", escape_tag(s))),
        Value::Bool(b) => Ok(format!("{field}:{{{b}}}")),
        _ => Err(unsupported("only scalar values can be matched")),
    }
}

/// Membership in a list: a single tag union when every item is a tag value,
/// otherwise a disjunction of per-item matches.
fn any_of(field: &str, items: &[Value]) -> FilterResult<String> {
    if items.is_empty() {
        return Err(unsupported("membership in an empty list"));
    }
    if items.iter().all(|item| !item.is_number()) {
        let tags: Vec<String> = items
            .iter()
            .map(|item| match item {
                Value::String(s) => escape_tag(s),
                other => other.to_string(),
            })
            .collect();
        return Ok(format!("{field}:{{{}}}", tags.join(" | ")));
    }
    let parts = items
        .iter()
        .map(|item| equals(field, item))
        .collect::<FilterResult<Vec<_>>>()?;
    Ok(format!("({})", parts.join(" | ")))
}

fn number(value: &Value) -> FilterResult<String> {
    match value {
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(unsupported("ordering is only supported on numeric fields")),
    }
}

/// Backslash-escape everything except alphanumerics and `_`.
fn escape_tag(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if !(c.is_alphanumeric() || c == '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn unsupported(reason: &str) -> FilterError {
    FilterError::UnsupportedInDialect {
        dialect: DIALECT.to_string(),
        reason: reason.to_string(),
    }
}
