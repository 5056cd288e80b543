mod config_error;
mod embedding_error;
mod filter_error;
mod recall_error;
mod retrieval_error;

pub use config_error::ConfigError;
pub use embedding_error::EmbeddingError;
pub use filter_error::FilterError;
pub use recall_error::{RecallError, RecallResult};
pub use retrieval_error::RetrievalError;

/// Result alias for filter compilation and evaluation.
pub type FilterResult<T> = Result<T, FilterError>;
