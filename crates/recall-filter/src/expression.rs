//! Filter expression tree, builders, and JSON parsing.

use std::str::FromStr;

use serde_json::{Map, Value};

use recall_core::errors::{FilterError, FilterResult};

use crate::operator::{FilterOperator, OperandKind};

/// Right-hand side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    None,
    Scalar(Value),
    Pair(Value, Value),
    List(Vec<Value>),
}

/// A single `field <operator> operand` test.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Dotted path, validated at compile/evaluate time.
    pub field: String,
    pub operator: FilterOperator,
    pub operand: Operand,
    /// Applies to CONTAINS, NOT_CONTAINS, STARTS_WITH, ENDS_WITH, REGEX.
    pub case_sensitive: bool,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: FilterOperator, operand: Operand) -> Self {
        Self {
            field: field.into(),
            operator,
            operand,
            case_sensitive: true,
        }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }
}

/// Boolean connective of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupLogic {
    And,
    Or,
    /// None of the children hold (NOR).
    Not,
}

impl GroupLogic {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
        }
    }
}

/// A backend-agnostic filter. Built per call, compiled once, then dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    Condition(Condition),
    Group {
        logic: GroupLogic,
        children: Vec<FilterExpression>,
    },
}

impl From<Condition> for FilterExpression {
    fn from(condition: Condition) -> Self {
        Self::Condition(condition)
    }
}

impl FilterExpression {
    pub fn condition(
        field: impl Into<String>,
        operator: FilterOperator,
        operand: Operand,
    ) -> Self {
        Self::Condition(Condition::new(field, operator, operand))
    }

    pub fn and(children: Vec<FilterExpression>) -> Self {
        Self::Group {
            logic: GroupLogic::And,
            children,
        }
    }

    pub fn or(children: Vec<FilterExpression>) -> Self {
        Self::Group {
            logic: GroupLogic::Or,
            children,
        }
    }

    /// "None of `children` hold".
    pub fn not(children: Vec<FilterExpression>) -> Self {
        Self::Group {
            logic: GroupLogic::Not,
            children,
        }
    }

    // --- Shorthand condition constructors ---

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::condition(field, FilterOperator::Eq, Operand::Scalar(value.into()))
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::condition(field, FilterOperator::Ne, Operand::Scalar(value.into()))
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::condition(field, FilterOperator::Gt, Operand::Scalar(value.into()))
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::condition(field, FilterOperator::Gte, Operand::Scalar(value.into()))
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::condition(field, FilterOperator::Lt, Operand::Scalar(value.into()))
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::condition(field, FilterOperator::Lte, Operand::Scalar(value.into()))
    }

    pub fn between(
        field: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self::condition(
            field,
            FilterOperator::Between,
            Operand::Pair(low.into(), high.into()),
        )
    }

    pub fn in_list<V: Into<Value>>(field: impl Into<String>, values: Vec<V>) -> Self {
        Self::condition(
            field,
            FilterOperator::In,
            Operand::List(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Self::condition(field, FilterOperator::Exists, Operand::None)
    }

    /// Nesting depth: a lone condition is 1.
    pub fn depth(&self) -> usize {
        match self {
            Self::Condition(_) => 1,
            Self::Group { children, .. } => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
        }
    }

    /// Number of conditions in the tree.
    pub fn condition_count(&self) -> usize {
        match self {
            Self::Condition(_) => 1,
            Self::Group { children, .. } => children.iter().map(Self::condition_count).sum(),
        }
    }

    /// Parse the JSON form:
    ///
    /// ```json
    /// {"and": [
    ///   {"field": "category", "op": "==", "value": "knowledge"},
    ///   {"field": "importance_score", "op": ">", "value": 0.7}
    /// ]}
    /// ```
    ///
    /// Groups use a single `and`/`or`/`not` key; `not` also accepts a single
    /// child object. Conditions accept `op` or `operator`, and an optional
    /// `case_sensitive` (default `true`).
    pub fn from_json(value: &Value) -> FilterResult<Self> {
        let obj = value.as_object().ok_or_else(|| invalid("expected a JSON object"))?;

        for (key, logic) in [
            ("and", GroupLogic::And),
            ("or", GroupLogic::Or),
            ("not", GroupLogic::Not),
        ] {
            if let Some(children) = obj.get(key) {
                if obj.len() != 1 {
                    return Err(invalid(&format!("group '{key}' must be the only key")));
                }
                let children = match children {
                    Value::Array(items) => items
                        .iter()
                        .map(Self::from_json)
                        .collect::<FilterResult<Vec<_>>>()?,
                    Value::Object(_) if logic == GroupLogic::Not => {
                        vec![Self::from_json(children)?]
                    }
                    _ => return Err(invalid(&format!("group '{key}' expects an array"))),
                };
                return Ok(Self::Group { logic, children });
            }
        }

        parse_condition(obj).map(Self::Condition)
    }
}

fn parse_condition(obj: &Map<String, Value>) -> FilterResult<Condition> {
    let field = obj
        .get("field")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("condition is missing a string 'field'"))?;
    let op = obj
        .get("op")
        .or_else(|| obj.get("operator"))
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("condition is missing a string 'op'"))?;
    let operator = FilterOperator::from_str(op)?;
    let raw = obj.get("value").unwrap_or(&Value::Null);

    let operand = match (operator.operand_kind(), raw) {
        (OperandKind::None, _) => Operand::None,
        (OperandKind::Pair, Value::Array(items)) if items.len() == 2 => {
            Operand::Pair(items[0].clone(), items[1].clone())
        }
        (OperandKind::Pair, _) => {
            return Err(FilterError::InvalidOperand {
                field: field.to_string(),
                operator: operator.to_string(),
                expected: "exactly two bounds [low, high]".to_string(),
            })
        }
        (OperandKind::List, Value::Array(items)) => Operand::List(items.clone()),
        // Scalars under list operators are left for validation to reject.
        (_, other) => Operand::Scalar(other.clone()),
    };

    let case_sensitive = match obj.get("case_sensitive") {
        None => true,
        Some(Value::Bool(flag)) => *flag,
        Some(_) => return Err(invalid("'case_sensitive' must be a boolean")),
    };

    Ok(Condition {
        field: field.to_string(),
        operator,
        operand,
        case_sensitive,
    })
}

fn invalid(reason: &str) -> FilterError {
    FilterError::InvalidExpression {
        reason: reason.to_string(),
    }
}
