//! In-memory evaluation of filter expressions against JSON records.

use std::cell::OnceCell;
use std::collections::BTreeSet;

use regex::Regex;
use serde_json::Value;

use recall_core::errors::{FilterError, FilterResult};

use crate::expression::{Condition, FilterExpression, GroupLogic, Operand};
use crate::operator::FilterOperator;
use crate::path::{flatten_keys, FieldPath};
use crate::validate::{check_condition, MAX_FILTER_DEPTH};
use crate::value::{as_members, compare, list_contains, values_equal};

/// Evaluate `expr` against `record`.
///
/// Runs the same validation as `compile()`; anything `compile()` would
/// reject is rejected here too.
pub fn evaluate(expr: &FilterExpression, record: &Value) -> FilterResult<bool> {
    Ok(PreparedFilter::new(expr)?.matches(record))
}

/// Keep the records that satisfy `expr`, preserving order.
pub fn filter_records<'r>(
    expr: &FilterExpression,
    records: &'r [Value],
) -> FilterResult<Vec<&'r Value>> {
    let prepared = PreparedFilter::new(expr)?;
    Ok(records.iter().filter(|r| prepared.matches(r)).collect())
}

/// A validated expression with paths parsed and regexes compiled, reusable
/// across many records.
#[derive(Debug)]
pub struct PreparedFilter<'e> {
    root: Node<'e>,
}

#[derive(Debug)]
enum Node<'e> {
    Condition {
        condition: &'e Condition,
        path: FieldPath,
        regex: Option<Regex>,
    },
    Group {
        logic: GroupLogic,
        children: Vec<Node<'e>>,
    },
}

impl<'e> PreparedFilter<'e> {
    pub fn new(expr: &'e FilterExpression) -> FilterResult<Self> {
        Ok(Self {
            root: prepare(expr, 1)?,
        })
    }

    pub fn matches(&self, record: &Value) -> bool {
        let keys = OnceCell::new();
        eval_node(&self.root, record, &keys)
    }
}

fn prepare(expr: &FilterExpression, depth: usize) -> FilterResult<Node<'_>> {
    if depth > MAX_FILTER_DEPTH {
        return Err(FilterError::DepthExceeded {
            max_depth: MAX_FILTER_DEPTH,
        });
    }
    match expr {
        FilterExpression::Condition(condition) => {
            let (path, regex) = check_condition(condition)?;
            Ok(Node::Condition {
                condition,
                path,
                regex,
            })
        }
        FilterExpression::Group { logic, children } => Ok(Node::Group {
            logic: *logic,
            children: children
                .iter()
                .map(|child| prepare(child, depth + 1))
                .collect::<FilterResult<Vec<_>>>()?,
        }),
    }
}

fn eval_node(node: &Node<'_>, record: &Value, keys: &OnceCell<BTreeSet<String>>) -> bool {
    match node {
        Node::Condition {
            condition,
            path,
            regex,
        } => {
            if condition.operator.is_existence() {
                let present = keys
                    .get_or_init(|| flatten_keys(record))
                    .contains(path.as_str());
                return match condition.operator {
                    FilterOperator::Exists | FilterOperator::IsNotNull => present,
                    _ => !present,
                };
            }
            let value = path.resolve(record);
            match condition.operator.negates() {
                Some(positive) => !holds(positive, condition, value, regex.as_ref()),
                None => holds(condition.operator, condition, value, regex.as_ref()),
            }
        }
        Node::Group { logic, children } => match logic {
            GroupLogic::And => children.iter().all(|c| eval_node(c, record, keys)),
            GroupLogic::Or => children.iter().any(|c| eval_node(c, record, keys)),
            GroupLogic::Not => !children.iter().any(|c| eval_node(c, record, keys)),
        },
    }
}

/// Positive operator semantics. An absent field never satisfies a positive operator.
fn holds(
    operator: FilterOperator,
    condition: &Condition,
    value: Option<&Value>,
    regex: Option<&Regex>,
) -> bool {
    let Some(value) = value else {
        return false;
    };
    let operand = &condition.operand;

    match (operator, operand) {
        (FilterOperator::Eq, Operand::Scalar(target)) => values_equal(value, target),
        (FilterOperator::Gt, Operand::Scalar(target)) => compare(value, target).is_some_and(|o| o.is_gt()),
        (FilterOperator::Gte, Operand::Scalar(target)) => compare(value, target).is_some_and(|o| o.is_ge()),
        (FilterOperator::Lt, Operand::Scalar(target)) => compare(value, target).is_some_and(|o| o.is_lt()),
        (FilterOperator::Lte, Operand::Scalar(target)) => compare(value, target).is_some_and(|o| o.is_le()),
        (FilterOperator::Between, Operand::Pair(low, high)) => {
            compare(value, low).is_some_and(|o| o.is_ge())
                && compare(value, high).is_some_and(|o| o.is_le())
        }
        (
            FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith,
            Operand::Scalar(Value::String(needle)),
        ) => {
            let Some(haystack) = value.as_str() else {
                return false;
            };
            let (haystack, needle) = if condition.case_sensitive {
                (haystack.to_string(), needle.clone())
            } else {
                (haystack.to_lowercase(), needle.to_lowercase())
            };
            match operator {
                FilterOperator::Contains => haystack.contains(&needle),
                FilterOperator::StartsWith => haystack.starts_with(&needle),
                _ => haystack.ends_with(&needle),
            }
        }
        (FilterOperator::Regex, _) => match (value.as_str(), regex) {
            (Some(text), Some(re)) => re.is_match(text),
            _ => false,
        },
        (FilterOperator::In, Operand::List(items)) => list_contains(items, value),
        (FilterOperator::AnyOf, Operand::List(items)) => {
            as_members(value).into_iter().any(|m| list_contains(items, m))
        }
        (FilterOperator::AllOf, Operand::List(items)) => {
            let members = as_members(value);
            items
                .iter()
                .all(|item| members.iter().any(|m| values_equal(m, item)))
        }
        // Validation guarantees the operand shape; anything else cannot hold.
        _ => false,
    }
}
