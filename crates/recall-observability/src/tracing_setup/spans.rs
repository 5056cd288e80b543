//! Span definitions for search, optimize, and filter compilation.

/// Span around one hybrid search.
#[macro_export]
macro_rules! search_span {
    ($query:expr, $origins:expr) => {
        tracing::info_span!("recall.search", query = %$query, origins = $origins)
    };
}

/// Span around one `optimize()` call.
#[macro_export]
macro_rules! optimize_span {
    ($items:expr, $max_tokens:expr) => {
        tracing::info_span!("recall.optimize", items = $items, max_tokens = $max_tokens)
    };
}

/// Span around filter compilation.
#[macro_export]
macro_rules! compile_span {
    ($dialect:expr) => {
        tracing::debug_span!("recall.compile", dialect = %$dialect)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const SEARCH: &str = "recall.search";
    pub const OPTIMIZE: &str = "recall.optimize";
    pub const COMPILE: &str = "recall.compile";
}
