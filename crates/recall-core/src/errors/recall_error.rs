use super::{ConfigError, EmbeddingError, FilterError, RetrievalError};

/// Top-level error for the recall pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RecallError {
    #[error("filter error: {0}")]
    FilterError(#[from] FilterError),

    #[error("retrieval error: {0}")]
    RetrievalError(#[from] RetrievalError),

    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type RecallResult<T> = Result<T, RecallError>;
