//! Deadline-bounded access to the embedding oracle.
//!
//! Every stage asks for its embeddings in one batch. A call that fails,
//! returns the wrong number of vectors, or finishes after the deadline yields
//! `None`; the stage falls back to its heuristic and the run is marked
//! degraded.

use std::time::{Duration, Instant};

use recall_core::traits::IEmbeddingProvider;
use recall_observability::tracing_setup::events;

pub(crate) struct Oracle<'a> {
    provider: Option<&'a dyn IEmbeddingProvider>,
    deadline: Option<Instant>,
    degraded: bool,
}

impl<'a> Oracle<'a> {
    pub(crate) fn new(provider: Option<&'a dyn IEmbeddingProvider>, timeout: Option<Duration>) -> Self {
        Self {
            provider,
            deadline: timeout.map(|t| Instant::now() + t),
            degraded: false,
        }
    }

    pub(crate) fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub(crate) fn degraded(&self) -> bool {
        self.degraded
    }

    /// Record a fallback that happened outside an embedding call.
    pub(crate) fn degrade(&mut self, stage: &str, reason: &str) {
        events::oracle_degraded(stage, reason);
        self.degraded = true;
    }

    fn past_deadline(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() > d)
    }

    /// Embed `texts` in a single call. `None` when no oracle is configured
    /// or the call degraded.
    pub(crate) fn embed_batch(&mut self, stage: &str, texts: &[String]) -> Option<Vec<Vec<f32>>> {
        let provider = self.provider?;
        if texts.is_empty() {
            return Some(Vec::new());
        }
        if self.past_deadline() {
            self.degrade(stage, "oracle deadline already passed");
            return None;
        }
        if !provider.is_available() {
            self.degrade(stage, &format!("{} unavailable", provider.name()));
            return None;
        }

        match provider.embed_batch(texts) {
            Ok(_) if self.past_deadline() => {
                self.degrade(stage, "oracle returned after the deadline");
                None
            }
            Ok(vectors) if vectors.len() != texts.len() => {
                self.degrade(
                    stage,
                    &format!("{} vectors for {} texts", vectors.len(), texts.len()),
                );
                None
            }
            Ok(vectors) => Some(vectors),
            Err(e) => {
                self.degrade(stage, &e.to_string());
                None
            }
        }
    }
}
