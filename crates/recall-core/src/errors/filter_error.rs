/// Filter validation errors. Raised by `compile()` and `evaluate()` before any
/// predicate is applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("unknown filter operator: {operator}")]
    UnknownOperator { operator: String },

    #[error("invalid operand for {operator} on '{field}': expected {expected}")]
    InvalidOperand {
        field: String,
        operator: String,
        expected: String,
    },

    #[error("malformed field path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    #[error("filter nesting exceeds max depth {max_depth}")]
    DepthExceeded { max_depth: usize },

    #[error("invalid regex '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("{dialect} dialect cannot express: {reason}")]
    UnsupportedInDialect { dialect: String, reason: String },

    #[error("invalid filter expression: {reason}")]
    InvalidExpression { reason: String },
}
