//! # recall-filter
//!
//! The metadata filter engine. One operator enum drives both compilation to
//! backend query fragments and in-memory evaluation, so the two cannot drift.
//!
//! ## Architecture
//!
//! ```text
//! FilterExpression (Condition | Group{AND, OR, NOT})
//! ├── validate   depth, dotted paths, operand arity, regex syntax
//! ├── compile    → CompiledPredicate
//! │   ├── Relational  (PostgreSQL: $n params, JSONB path access)
//! │   └── TagIndex    (RediSearch query syntax)
//! └── evaluate   → bool against a JSON record
//! ```
//!
//! `NOT` groups mean "none of the children hold" (NOR), in every backend.

pub mod compile;
pub mod evaluate;
pub mod expression;
pub mod operator;
pub mod path;
pub mod validate;
mod value;

pub use compile::{compile, Dialect};
pub use evaluate::{evaluate, filter_records, PreparedFilter};
pub use expression::{Condition, FilterExpression, GroupLogic, Operand};
pub use operator::FilterOperator;
pub use path::{flatten_keys, FieldPath};
pub use recall_core::errors::{FilterError, FilterResult};
pub use validate::{validate, MAX_FILTER_DEPTH};
