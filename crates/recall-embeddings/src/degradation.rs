//! Provider fallback chain.
//!
//! Providers are tried in order. A provider that is unavailable, errors, or
//! returns vectors of the wrong dimensionality is skipped; each fallback is
//! recorded as a `DegradationEvent`.

use std::sync::Mutex;

use recall_core::errors::{EmbeddingError, RecallError, RecallResult};
use recall_core::models::DegradationEvent;
use recall_core::traits::IEmbeddingProvider;
use tracing::warn;

pub struct DegradationChain {
    providers: Vec<Box<dyn IEmbeddingProvider>>,
    dimensions: usize,
    events: Mutex<Vec<DegradationEvent>>,
}

impl DegradationChain {
    /// An empty chain producing vectors of `dimensions`.
    pub fn new(dimensions: usize) -> Self {
        Self {
            providers: Vec::new(),
            dimensions,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Add a provider to the end of the chain.
    pub fn push(&mut self, provider: Box<dyn IEmbeddingProvider>) {
        self.providers.push(provider);
    }

    pub fn with(mut self, provider: Box<dyn IEmbeddingProvider>) -> Self {
        self.push(provider);
        self
    }

    /// Name of the first available provider.
    pub fn active_provider_name(&self) -> &str {
        self.providers
            .iter()
            .find(|p| p.is_available())
            .map(|p| p.name())
            .unwrap_or("none")
    }

    /// Drain accumulated degradation events.
    pub fn drain_events(&self) -> Vec<DegradationEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    fn record_fallback(&self, failed: &str, used: &str) {
        let event = DegradationEvent::now("embeddings", format!("{failed} failed"), used);
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }

    fn check_dimensions(&self, vectors: &[Vec<f32>]) -> RecallResult<()> {
        match vectors.iter().find(|v| v.len() != self.dimensions) {
            Some(bad) => Err(EmbeddingError::DimensionMismatch {
                expected: self.dimensions,
                actual: bad.len(),
            }
            .into()),
            None => Ok(()),
        }
    }

    /// Run `call` against each available provider until one succeeds.
    fn first_success<T>(
        &self,
        call: impl Fn(&dyn IEmbeddingProvider) -> RecallResult<Vec<Vec<f32>>>,
        finish: impl FnOnce(Vec<Vec<f32>>) -> T,
    ) -> RecallResult<T> {
        let mut last_error: Option<RecallError> = None;
        let mut first_failed: Option<&str> = None;

        for provider in &self.providers {
            if !provider.is_available() {
                first_failed.get_or_insert(provider.name());
                continue;
            }
            match call(provider.as_ref()).and_then(|v| self.check_dimensions(&v).map(|_| v)) {
                Ok(vectors) => {
                    if let Some(failed) = first_failed {
                        self.record_fallback(failed, provider.name());
                    }
                    return Ok(finish(vectors));
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "embedding provider failed, trying next in chain"
                    );
                    first_failed.get_or_insert(provider.name());
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            EmbeddingError::ProviderUnavailable {
                provider: format!("all {} providers exhausted", self.providers.len()),
            }
            .into()
        }))
    }
}

impl IEmbeddingProvider for DegradationChain {
    fn embed(&self, text: &str) -> RecallResult<Vec<f32>> {
        self.first_success(
            |p| p.embed(text).map(|v| vec![v]),
            |mut vectors| vectors.pop().unwrap_or_default(),
        )
    }

    fn embed_batch(&self, texts: &[String]) -> RecallResult<Vec<Vec<f32>>> {
        self.first_success(
            |p| {
                let vectors = p.embed_batch(texts)?;
                if vectors.len() != texts.len() {
                    return Err(EmbeddingError::InferenceFailed {
                        reason: format!(
                            "{} returned {} vectors for {} texts",
                            p.name(),
                            vectors.len(),
                            texts.len()
                        ),
                    }
                    .into());
                }
                Ok(vectors)
            },
            |vectors| vectors,
        )
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        self.active_provider_name()
    }

    fn is_available(&self) -> bool {
        self.providers.iter().any(|p| p.is_available())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::HashingEmbedder;

    struct FailingProvider;

    impl IEmbeddingProvider for FailingProvider {
        fn embed(&self, _text: &str) -> RecallResult<Vec<f32>> {
            Err(EmbeddingError::InferenceFailed {
                reason: "mock failure".to_string(),
            }
            .into())
        }
        fn embed_batch(&self, _texts: &[String]) -> RecallResult<Vec<Vec<f32>>> {
            Err(EmbeddingError::InferenceFailed {
                reason: "mock failure".to_string(),
            }
            .into())
        }
        fn dimensions(&self) -> usize {
            16
        }
        fn name(&self) -> &str {
            "failing-mock"
        }
        fn is_available(&self) -> bool {
            true
        }
    }

    #[test]
    fn primary_success_records_nothing() {
        let chain = DegradationChain::new(16).with(Box::new(HashingEmbedder::new(16)));
        assert_eq!(chain.embed("query").unwrap().len(), 16);
        assert!(chain.drain_events().is_empty());
        assert_eq!(chain.name(), "hashing");
    }

    #[test]
    fn falls_back_and_records_event() {
        let chain = DegradationChain::new(16)
            .with(Box::new(FailingProvider))
            .with(Box::new(HashingEmbedder::new(16)));
        let batch = chain
            .embed_batch(&["a b".to_string(), "c d".to_string()])
            .unwrap();
        assert_eq!(batch.len(), 2);

        let events = chain.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].fallback_used, "hashing");
        assert!(chain.drain_events().is_empty());
    }

    #[test]
    fn wrong_dimensions_are_skipped() {
        let chain = DegradationChain::new(32)
            .with(Box::new(HashingEmbedder::new(8)))
            .with(Box::new(HashingEmbedder::new(32)));
        assert_eq!(chain.embed("text").unwrap().len(), 32);
        assert_eq!(chain.drain_events().len(), 1);
    }

    #[test]
    fn exhausted_chain_errors() {
        let chain = DegradationChain::new(16).with(Box::new(FailingProvider));
        assert!(chain.embed("x").is_err());
        assert!(DegradationChain::new(16).embed("x").is_err());
    }
}
