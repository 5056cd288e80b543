/// Hybrid search errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RetrievalError {
    #[error("all origins failed: {}", origins.join(", "))]
    AllOriginsFailed { origins: Vec<String> },

    #[error("search cancelled by caller")]
    Cancelled,

    #[error("search timed out after {timeout_ms}ms")]
    TimedOut { timeout_ms: u64 },

    #[error("no origins registered for search")]
    NoOrigins,

    #[error("origin {origin} failed: {reason}")]
    OriginFailed { origin: String, reason: String },

    #[error("record store failed: {reason}")]
    RecordStoreFailed { reason: String },

    #[error("invalid search request: {reason}")]
    InvalidRequest { reason: String },

    #[error("background task failed: {reason}")]
    TaskFailed { reason: String },
}
