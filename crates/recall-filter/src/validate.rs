//! Structural validation shared by `compile()` and `evaluate()`.
//!
//! Both entry points run this first, so they reject exactly the same inputs.

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use recall_core::errors::{FilterError, FilterResult};

use crate::expression::{Condition, FilterExpression, Operand};
use crate::operator::{FilterOperator, OperandKind};
use crate::path::FieldPath;
use crate::value::{is_ordered, is_scalar};

/// Maximum nesting depth of a filter tree.
pub const MAX_FILTER_DEPTH: usize = 32;

/// Validate the whole tree.
pub fn validate(expr: &FilterExpression) -> FilterResult<()> {
    walk(expr, 1)
}

fn walk(expr: &FilterExpression, depth: usize) -> FilterResult<()> {
    if depth > MAX_FILTER_DEPTH {
        return Err(FilterError::DepthExceeded {
            max_depth: MAX_FILTER_DEPTH,
        });
    }
    match expr {
        FilterExpression::Condition(condition) => check_condition(condition).map(|_| ()),
        FilterExpression::Group { children, .. } => {
            children.iter().try_for_each(|child| walk(child, depth + 1))
        }
    }
}

/// Validate one condition, returning its parsed path and (for REGEX) compiled pattern.
pub(crate) fn check_condition(condition: &Condition) -> FilterResult<(FieldPath, Option<Regex>)> {
    let path = FieldPath::parse(&condition.field)?;
    let kind = condition.operator.operand_kind();

    let ok = match (kind, &condition.operand) {
        (OperandKind::None, Operand::None) => true,
        (OperandKind::Scalar, Operand::Scalar(v)) => is_scalar(v),
        (OperandKind::Ordered, Operand::Scalar(v)) => is_ordered(v),
        (OperandKind::Text, Operand::Scalar(v)) => v.is_string(),
        (OperandKind::Pair, Operand::Pair(low, high)) => matches!(
            (low, high),
            (Value::Number(_), Value::Number(_)) | (Value::String(_), Value::String(_))
        ),
        (OperandKind::List, Operand::List(items)) => items.iter().all(is_scalar),
        _ => false,
    };
    if !ok {
        return Err(FilterError::InvalidOperand {
            field: condition.field.clone(),
            operator: condition.operator.to_string(),
            expected: expected(kind).to_string(),
        });
    }

    let regex = match (&condition.operand, condition.operator) {
        (Operand::Scalar(Value::String(pattern)), FilterOperator::Regex) => Some(
            RegexBuilder::new(pattern)
                .case_insensitive(!condition.case_sensitive)
                .build()
                .map_err(|e| FilterError::InvalidRegex {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })?,
        ),
        _ => None,
    };

    Ok((path, regex))
}

fn expected(kind: OperandKind) -> &'static str {
    match kind {
        OperandKind::Scalar => "a non-null string, number, or boolean",
        OperandKind::Ordered => "a number or string",
        OperandKind::Pair => "exactly two bounds [low, high] of the same type (numbers or strings)",
        OperandKind::Text => "a string",
        OperandKind::List => "a list of non-null scalars",
        OperandKind::None => "no operand",
    }
}
