//! Compilation of filter expressions into backend query fragments.

mod relational;
mod tag_index;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use recall_core::errors::FilterResult;
use recall_core::models::CompiledPredicate;

use crate::expression::FilterExpression;
use crate::validate::validate;

/// Target query language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// PostgreSQL `WHERE` fragment with `$n` placeholders. Top-level fields
    /// are columns; nested fields are JSONB paths into the top-level column.
    Relational,
    /// RediSearch query string. Dotted paths map to `__`-joined field aliases;
    /// tag fields are assumed to be declared `CASESENSITIVE`.
    ///
    /// A tag field may hold several values, and a tag query cannot tell a
    /// scalar from a list. `IN` therefore compiles to the same union as
    /// `ANY_OF`, and `NOT_IN` to its negation. On a multi-valued field the
    /// index matches records the evaluator rejects, because the evaluator
    /// compares the whole list against each member.
    TagIndex,
}

impl Dialect {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relational => "relational",
            Self::TagIndex => "tag_index",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compile `expr` for `dialect`.
///
/// Validation runs first and is identical to `evaluate()`'s. A dialect may
/// additionally reject constructs it cannot express with the same meaning
/// (`FilterError::UnsupportedInDialect`).
pub fn compile(expr: &FilterExpression, dialect: Dialect) -> FilterResult<CompiledPredicate> {
    validate(expr)?;

    let compiled = match dialect {
        Dialect::Relational => {
            let (text, params) = relational::compile(expr)?;
            CompiledPredicate::Relational { text, params }
        }
        Dialect::TagIndex => CompiledPredicate::TagIndex {
            query_string: tag_index::compile(expr)?,
        },
    };

    debug!(
        dialect = %dialect,
        conditions = expr.condition_count(),
        depth = expr.depth(),
        params = compiled.params().len(),
        "filter compiled"
    );
    Ok(compiled)
}
