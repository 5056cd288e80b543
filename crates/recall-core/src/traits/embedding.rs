use crate::errors::RecallResult;

/// Embedding oracle. Must be deterministic for a given text and provider version.
pub trait IEmbeddingProvider: Send + Sync {
    /// Embed a single text, returning a vector of floats.
    fn embed(&self, text: &str) -> RecallResult<Vec<f32>>;

    /// Embed a batch of texts. Output order matches input order.
    fn embed_batch(&self, texts: &[String]) -> RecallResult<Vec<Vec<f32>>>;

    /// The dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Whether this provider is currently available.
    fn is_available(&self) -> bool;
}
