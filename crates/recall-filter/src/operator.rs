//! The single operator set shared by compilation and evaluation.

use std::fmt;
use std::str::FromStr;

use recall_core::errors::FilterError;

/// Comparison operator of a filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Between,
    NotBetween,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Regex,
    In,
    NotIn,
    AnyOf,
    AllOf,
    NoneOf,
    IsNull,
    IsNotNull,
    Exists,
    NotExists,
}

/// Shape of operand an operator requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// A non-null scalar.
    Scalar,
    /// A number or string to order against.
    Ordered,
    /// A `[low, high]` pair of numbers or of strings.
    Pair,
    /// A string.
    Text,
    /// A list of non-null scalars.
    List,
    /// No operand.
    None,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 22] = [
        Self::Eq,
        Self::Ne,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::Between,
        Self::NotBetween,
        Self::Contains,
        Self::NotContains,
        Self::StartsWith,
        Self::EndsWith,
        Self::Regex,
        Self::In,
        Self::NotIn,
        Self::AnyOf,
        Self::AllOf,
        Self::NoneOf,
        Self::IsNull,
        Self::IsNotNull,
        Self::Exists,
        Self::NotExists,
    ];

    /// Canonical upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "EQ",
            Self::Ne => "NE",
            Self::Gt => "GT",
            Self::Gte => "GTE",
            Self::Lt => "LT",
            Self::Lte => "LTE",
            Self::Between => "BETWEEN",
            Self::NotBetween => "NOT_BETWEEN",
            Self::Contains => "CONTAINS",
            Self::NotContains => "NOT_CONTAINS",
            Self::StartsWith => "STARTS_WITH",
            Self::EndsWith => "ENDS_WITH",
            Self::Regex => "REGEX",
            Self::In => "IN",
            Self::NotIn => "NOT_IN",
            Self::AnyOf => "ANY_OF",
            Self::AllOf => "ALL_OF",
            Self::NoneOf => "NONE_OF",
            Self::IsNull => "IS_NULL",
            Self::IsNotNull => "IS_NOT_NULL",
            Self::Exists => "EXISTS",
            Self::NotExists => "NOT_EXISTS",
        }
    }

    pub fn operand_kind(self) -> OperandKind {
        match self {
            Self::Eq | Self::Ne => OperandKind::Scalar,
            Self::Gt | Self::Gte | Self::Lt | Self::Lte => OperandKind::Ordered,
            Self::Between | Self::NotBetween => OperandKind::Pair,
            Self::Contains
            | Self::NotContains
            | Self::StartsWith
            | Self::EndsWith
            | Self::Regex => OperandKind::Text,
            Self::In | Self::NotIn | Self::AnyOf | Self::AllOf | Self::NoneOf => OperandKind::List,
            Self::IsNull | Self::IsNotNull | Self::Exists | Self::NotExists => OperandKind::None,
        }
    }

    /// For negated operators, the positive operator they negate.
    ///
    /// A negated condition holds exactly when its positive form does not,
    /// including on records where the field is absent.
    pub fn negates(self) -> Option<FilterOperator> {
        match self {
            Self::Ne => Some(Self::Eq),
            Self::NotBetween => Some(Self::Between),
            Self::NotContains => Some(Self::Contains),
            Self::NotIn => Some(Self::In),
            Self::NoneOf => Some(Self::AnyOf),
            _ => None,
        }
    }

    /// Existence checks look only at the record's key set, never the value.
    pub fn is_existence(self) -> bool {
        matches!(
            self,
            Self::IsNull | Self::IsNotNull | Self::Exists | Self::NotExists
        )
    }

    /// Whether the `case_sensitive` flag affects this operator.
    pub fn is_string_match(self) -> bool {
        matches!(
            self,
            Self::Contains | Self::NotContains | Self::StartsWith | Self::EndsWith | Self::Regex
        )
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = FilterError;

    /// Accepts canonical names in any case, with `_` or spaces, plus symbols.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        let op = match normalized.as_str() {
            "EQ" | "==" | "=" | "EQUALS" => Self::Eq,
            "NE" | "!=" | "<>" | "NOT_EQUALS" => Self::Ne,
            "GT" | ">" => Self::Gt,
            "GTE" | ">=" => Self::Gte,
            "LT" | "<" => Self::Lt,
            "LTE" | "<=" => Self::Lte,
            "BETWEEN" => Self::Between,
            "NOT_BETWEEN" => Self::NotBetween,
            "CONTAINS" => Self::Contains,
            "NOT_CONTAINS" => Self::NotContains,
            "STARTS_WITH" => Self::StartsWith,
            "ENDS_WITH" => Self::EndsWith,
            "REGEX" | "MATCHES" => Self::Regex,
            "IN" => Self::In,
            "NOT_IN" => Self::NotIn,
            "ANY_OF" => Self::AnyOf,
            "ALL_OF" => Self::AllOf,
            "NONE_OF" => Self::NoneOf,
            "IS_NULL" => Self::IsNull,
            "IS_NOT_NULL" => Self::IsNotNull,
            "EXISTS" => Self::Exists,
            "NOT_EXISTS" => Self::NotExists,
            _ => {
                return Err(FilterError::UnknownOperator {
                    operator: s.to_string(),
                })
            }
        };
        Ok(op)
    }
}
