use crate::errors::RecallResult;

/// Injected relevance scorer for the optimizer's verification stage.
pub trait IRelevanceScorer: Send + Sync {
    /// Score each text against `query`. Output order matches input order;
    /// scores are expected in [0, 1].
    fn score(&self, query: &str, texts: &[String]) -> RecallResult<Vec<f64>>;

    fn name(&self) -> &str;
}
