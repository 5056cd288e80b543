mod backends;
mod embedding;
mod record_store;
mod relevance;

pub use backends::{ILexicalBackend, ITagIndexBackend, IVectorBackend};
pub use embedding::IEmbeddingProvider;
pub use record_store::IRecordStore;
pub use relevance::IRelevanceScorer;
