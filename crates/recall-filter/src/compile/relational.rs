//! PostgreSQL `WHERE` fragments.
//!
//! Every condition compiles to a two-valued boolean: positive operators are
//! wrapped in `COALESCE(.., FALSE)` and negated ones in
//! `NOT COALESCE(<positive>, FALSE)`, so SQL NULL handling matches
//! `evaluate()` on absent fields.

use serde_json::Value;

use recall_core::errors::FilterResult;

use crate::expression::{Condition, FilterExpression, GroupLogic, Operand};
use crate::operator::FilterOperator;
use crate::path::FieldPath;

pub(super) fn compile(expr: &FilterExpression) -> FilterResult<(String, Vec<Value>)> {
    let mut builder = SqlBuilder::default();
    let text = builder.expression(expr)?;
    Ok((text, builder.params))
}

#[derive(Default)]
struct SqlBuilder {
    params: Vec<Value>,
}

/// How a field is reached from the row.
enum Access {
    Column(String),
    /// `doc` yields jsonb (`#>`), `text` yields text (`#>>`).
    Json { doc: String, text: String },
}

impl Access {
    fn of(path: &FieldPath) -> Self {
        let segments = path.segments();
        let column = format!("\"{}\"", segments[0]);
        if !path.is_nested() {
            return Self::Column(column);
        }
        let rest = segments[1..].join(",");
        Self::Json {
            doc: format!("{column} #> '{{{rest}}}'"),
            text: format!("{column} #>> '{{{rest}}}'"),
        }
    }

    /// The raw field, for null checks and equality.
    fn raw(&self) -> &str {
        match self {
            Self::Column(column) => column,
            Self::Json { doc, .. } => doc,
        }
    }

    /// The field as a number, NULL when it is not one.
    fn number(&self) -> String {
        match self {
            Self::Column(column) => column.clone(),
            Self::Json { doc, text } => {
                format!("(CASE WHEN jsonb_typeof({doc}) = 'number' THEN ({text})::numeric END)")
            }
        }
    }

    /// The field as text, NULL when it is not a string.
    fn string(&self) -> String {
        match self {
            Self::Column(column) => column.clone(),
            Self::Json { doc, text } => {
                format!("(CASE WHEN jsonb_typeof({doc}) = 'string' THEN {text} END)")
            }
        }
    }

    /// Byte-order comparable projection matching the operand's type.
    fn ordered(&self, operand: &Value) -> String {
        match operand {
            Value::String(_) => format!("{} COLLATE \"C\"", self.string()),
            _ => self.number(),
        }
    }

    /// The field viewed as a jsonb array (scalars become one-element arrays).
    fn members(&self) -> Option<String> {
        match self {
            Self::Column(_) => None,
            Self::Json { doc, .. } => Some(format!(
                "(CASE WHEN jsonb_typeof({doc}) = 'array' THEN {doc} ELSE jsonb_build_array({doc}) END)"
            )),
        }
    }
}

impl SqlBuilder {
    /// Allocate a fresh placeholder. Placeholders are never reused.
    fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    fn expression(&mut self, expr: &FilterExpression) -> FilterResult<String> {
        match expr {
            FilterExpression::Condition(condition) => self.condition(condition),
            FilterExpression::Group { logic, children } => {
                let parts = children
                    .iter()
                    .map(|child| self.expression(child))
                    .collect::<FilterResult<Vec<_>>>()?;
                Ok(match (logic, parts.is_empty()) {
                    (GroupLogic::And, true) | (GroupLogic::Not, true) => "TRUE".to_string(),
                    (GroupLogic::Or, true) => "FALSE".to_string(),
                    (GroupLogic::And, false) => format!("({})", parts.join(" AND ")),
                    (GroupLogic::Or, false) => format!("({})", parts.join(" OR ")),
                    (GroupLogic::Not, false) => format!("NOT ({})", parts.join(" OR ")),
                })
            }
        }
    }

    fn condition(&mut self, condition: &Condition) -> FilterResult<String> {
        let path = FieldPath::parse(&condition.field)?;
        let access = Access::of(&path);

        let null_check = match condition.operator {
            FilterOperator::Exists | FilterOperator::IsNotNull => Some("IS NOT NULL"),
            FilterOperator::NotExists | FilterOperator::IsNull => Some("IS NULL"),
            _ => None,
        };
        if let Some(check) = null_check {
            return Ok(format!("{} {check}", access.raw()));
        }

        Ok(match condition.operator.negates() {
            Some(positive) => format!(
                "NOT COALESCE({}, FALSE)",
                self.positive(positive, condition, &access)
            ),
            None => format!(
                "COALESCE({}, FALSE)",
                self.positive(condition.operator, condition, &access)
            ),
        })
    }

    fn positive(&mut self, operator: FilterOperator, condition: &Condition, access: &Access) -> String {
        match (&condition.operand, operator) {
            (Operand::Scalar(value), FilterOperator::Eq) => match access {
                Access::Column(column) => format!("{column} = {}", self.bind(value.clone())),
                Access::Json { doc, .. } => format!("{doc} = {}::jsonb", self.bind(value.clone())),
            },
            (
                Operand::Scalar(value),
                FilterOperator::Gt | FilterOperator::Gte | FilterOperator::Lt | FilterOperator::Lte,
            ) => {
                let symbol = match operator {
                    FilterOperator::Gt => ">",
                    FilterOperator::Gte => ">=",
                    FilterOperator::Lt => "<",
                    _ => "<=",
                };
                format!("{} {symbol} {}", access.ordered(value), self.bind(value.clone()))
            }
            (Operand::Pair(low, high), _) => {
                let field = access.ordered(low);
                let low = self.bind(low.clone());
                let high = self.bind(high.clone());
                format!("{field} BETWEEN {low} AND {high}")
            }
            (Operand::Scalar(value), FilterOperator::Regex) => {
                let symbol = if condition.case_sensitive { "~" } else { "~*" };
                format!("{} {symbol} {}", access.string(), self.bind(value.clone()))
            }
            (Operand::Scalar(Value::String(needle)), _) => {
                let escaped = escape_like(needle);
                let pattern = match operator {
                    FilterOperator::StartsWith => format!("{escaped}%"),
                    FilterOperator::EndsWith => format!("%{escaped}"),
                    _ => format!("%{escaped}%"),
                };
                let keyword = if condition.case_sensitive { "LIKE" } else { "ILIKE" };
                format!("{} {keyword} {}", access.string(), self.bind(Value::String(pattern)))
            }
            (Operand::List(items), FilterOperator::In) => {
                let list = self.bind(Value::Array(items.clone()));
                match access {
                    Access::Column(column) => format!("{column} = ANY({list})"),
                    Access::Json { doc, .. } => {
                        format!("{list}::jsonb @> jsonb_build_array({doc})")
                    }
                }
            }
            (Operand::List(items), FilterOperator::AnyOf) => {
                let list = self.bind(Value::Array(items.clone()));
                match access.members() {
                    None => format!("{} && {list}", access.raw()),
                    Some(members) => format!(
                        "EXISTS (SELECT 1 FROM jsonb_array_elements({members}) AS m(v) \
                         WHERE {list}::jsonb @> jsonb_build_array(m.v))"
                    ),
                }
            }
            (Operand::List(items), _) => {
                let list = self.bind(Value::Array(items.clone()));
                match access.members() {
                    None => format!("{} @> {list}", access.raw()),
                    Some(members) => {
                        format!("{} IS NOT NULL AND {members} @> {list}::jsonb", access.raw())
                    }
                }
            }
            // Unreachable after validation: operand shape always matches the operator.
            _ => "FALSE".to_string(),
        }
    }
}

/// Escape `LIKE` metacharacters with the default backslash escape.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
