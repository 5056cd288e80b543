//! # recall-observability
//!
//! Structured logging for the retrieval and optimization pipeline.
//!
//! - `tracing_setup`: subscriber installation, span macros, event helpers.
//! - `query_log`: bounded in-memory log of search and optimize calls.

pub mod query_log;
pub mod tracing_setup;

pub use query_log::{CallKind, QueryLog, QueryLogEntry};
pub use tracing_setup::{init_from_config, init_tracing, init_tracing_with_filter};
