//! HybridSearcher: concurrent fan-out over registered origins, then RRF.
//!
//! Each origin runs on the blocking pool behind a shared semaphore and its own
//! timeout. An origin that errors, times out, or cannot express the filter is
//! degraded to an empty list and reported in the metrics. The whole search is
//! bounded by the search timeout and the caller's cancellation token; either
//! one discards every partial result.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use recall_core::config::defaults::DEFAULT_ORIGIN_WEIGHT;
use recall_core::config::RetrievalConfig;
use recall_core::errors::{RecallResult, RetrievalError};
use recall_core::models::{CompiledPredicate, DegradedOrigin, FusedResult, SearchMetrics};
use recall_filter::{Dialect, FilterExpression};
use recall_observability::tracing_setup::events;
use recall_observability::{compile_span, search_span};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, Instrument};

use super::request::SearchRequest;
use super::rrf_fusion::{fuse, WeightedRanking};
use crate::origins::SearchOrigin;

/// Compiled filter per dialect. `Err` holds why the dialect rejected it.
type Predicates = HashMap<Dialect, Result<Arc<CompiledPredicate>, String>>;

struct OriginOutcome {
    origin: String,
    weight: f64,
    elapsed_ms: u64,
    result: Result<Vec<(String, f64)>, String>,
}

pub struct HybridSearcher {
    origins: Vec<Arc<dyn SearchOrigin>>,
    config: RetrievalConfig,
    limiter: Arc<Semaphore>,
}

#[derive(Default)]
pub struct HybridSearcherBuilder {
    origins: Vec<Arc<dyn SearchOrigin>>,
    config: RetrievalConfig,
}

impl HybridSearcherBuilder {
    pub fn origin(self, origin: impl SearchOrigin + 'static) -> Self {
        self.shared_origin(Arc::new(origin))
    }

    pub fn shared_origin(mut self, origin: Arc<dyn SearchOrigin>) -> Self {
        self.origins.push(origin);
        self
    }

    pub fn config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    /// Fails if two origins share a name.
    pub fn build(self) -> RecallResult<HybridSearcher> {
        for (i, origin) in self.origins.iter().enumerate() {
            if self.origins[..i].iter().any(|o| o.name() == origin.name()) {
                return Err(RetrievalError::InvalidRequest {
                    reason: format!("origin {} registered twice", origin.name()),
                }
                .into());
            }
        }
        let permits = self.config.max_concurrent_origins.max(1);
        Ok(HybridSearcher {
            origins: self.origins,
            config: self.config,
            limiter: Arc::new(Semaphore::new(permits)),
        })
    }
}

impl HybridSearcher {
    pub fn builder() -> HybridSearcherBuilder {
        HybridSearcherBuilder::default()
    }

    pub fn origin_names(&self) -> Vec<&str> {
        self.origins.iter().map(|o| o.name()).collect()
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Search every selected origin and fuse the results.
    ///
    /// Returns the top `limit` fused results and the run's metrics. Fails on
    /// an invalid filter or weights, when no origin is selected, when every
    /// origin fails, on the search timeout, and on cancellation.
    pub async fn search(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> RecallResult<(Vec<FusedResult>, SearchMetrics)> {
        let span = search_span!(request.query, self.origins.len());
        self.run(request, cancel).instrument(span).await
    }

    async fn run(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> RecallResult<(Vec<FusedResult>, SearchMetrics)> {
        let started = Instant::now();
        let selected = self.select(&request.weights)?;
        if selected.is_empty() {
            return Err(RetrievalError::NoOrigins.into());
        }
        let predicates = self.compile(request.filter.as_ref(), &selected)?;

        let limit = request.limit.unwrap_or(self.config.default_limit);
        let k = request.k.unwrap_or(self.config.rrf_k);
        let fetch = limit.saturating_mul(self.config.over_fetch_factor.max(1));

        let calls = selected.iter().map(|(origin, weight)| {
            let predicate = predicates.get(&origin.dialect()).cloned();
            self.call_origin(Arc::clone(origin), *weight, &request.query, predicate, fetch)
        });
        let search_timeout = Duration::from_millis(self.config.search_timeout_ms);

        let outcomes = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("search cancelled");
                return Err(RetrievalError::Cancelled.into());
            }
            finished = tokio::time::timeout(search_timeout, join_all(calls)) => match finished {
                Ok(outcomes) => outcomes,
                Err(_) => {
                    return Err(RetrievalError::TimedOut {
                        timeout_ms: self.config.search_timeout_ms,
                    }
                    .into())
                }
            },
        };

        let mut metrics = SearchMetrics::default();
        let mut rankings = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            metrics
                .origin_latency_ms
                .insert(outcome.origin.clone(), outcome.elapsed_ms);
            match outcome.result {
                Ok(hits) => {
                    metrics.origin_counts.insert(outcome.origin.clone(), hits.len());
                    rankings.push(WeightedRanking::from_ordered(&outcome.origin, outcome.weight, hits));
                }
                Err(reason) => {
                    events::origin_degraded(&outcome.origin, &reason, outcome.elapsed_ms);
                    metrics.origin_counts.insert(outcome.origin.clone(), 0);
                    metrics.degraded_origins.push(DegradedOrigin {
                        origin: outcome.origin,
                        reason,
                    });
                }
            }
        }
        if rankings.is_empty() {
            return Err(RetrievalError::AllOriginsFailed {
                origins: metrics
                    .degraded_origins
                    .iter()
                    .map(|d| format!("{} ({})", d.origin, d.reason))
                    .collect(),
            }
            .into());
        }

        let mut fused = fuse(&rankings, k);
        metrics.fused_count = fused.len();
        fused.truncate(limit);
        metrics.elapsed_ms = started.elapsed().as_millis() as u64;

        events::search_completed(
            metrics.fused_count,
            fused.len(),
            metrics.degraded_origins.len(),
            metrics.elapsed_ms,
        );
        Ok((fused, metrics))
    }

    /// Origins to query, with weights.
    ///
    /// Caller weights must name registered origins. Configured default
    /// weights for origins that are not registered are ignored.
    fn select(&self, weights: &BTreeMap<String, f64>) -> RecallResult<Vec<(Arc<dyn SearchOrigin>, f64)>> {
        for (name, weight) in weights {
            if !self.origins.iter().any(|o| o.name() == name) {
                return Err(RetrievalError::InvalidRequest {
                    reason: format!("unknown origin {name}"),
                }
                .into());
            }
            if !weight.is_finite() || *weight < 0.0 {
                return Err(RetrievalError::InvalidRequest {
                    reason: format!("weight {weight} for {name} must be finite and non-negative"),
                }
                .into());
            }
        }

        let weights = if weights.is_empty() {
            &self.config.default_weights
        } else {
            weights
        };
        Ok(self
            .origins
            .iter()
            .filter_map(|origin| {
                let weight = if weights.is_empty() {
                    Some(DEFAULT_ORIGIN_WEIGHT)
                } else {
                    weights.get(origin.name()).copied()
                };
                weight.map(|w| (Arc::clone(origin), w))
            })
            .collect())
    }

    /// Validate once, then compile for each dialect in use.
    fn compile(
        &self,
        filter: Option<&FilterExpression>,
        selected: &[(Arc<dyn SearchOrigin>, f64)],
    ) -> RecallResult<Predicates> {
        let mut compiled = Predicates::new();
        let Some(filter) = filter else {
            return Ok(compiled);
        };
        recall_filter::validate(filter)?;

        for (origin, _) in selected {
            let dialect = origin.dialect();
            if compiled.contains_key(&dialect) {
                continue;
            }
            let span = compile_span!(dialect);
            let _guard = span.enter();
            let predicate = recall_filter::compile(filter, dialect)
                .map(Arc::new)
                .map_err(|e| e.to_string());
            compiled.insert(dialect, predicate);
        }
        Ok(compiled)
    }

    async fn call_origin(
        &self,
        origin: Arc<dyn SearchOrigin>,
        weight: f64,
        query: &str,
        predicate: Option<Result<Arc<CompiledPredicate>, String>>,
        limit: usize,
    ) -> OriginOutcome {
        let name = origin.name().to_string();
        let started = Instant::now();
        let timeout_ms = self.config.origin_timeout_ms;

        let result = match predicate.transpose() {
            Err(reason) => Err(reason),
            Ok(predicate) => match Arc::clone(&self.limiter).acquire_owned().await {
                Err(_) => Err("origin limiter closed".to_string()),
                Ok(permit) => {
                    let query = query.to_string();
                    let task = tokio::task::spawn_blocking(move || {
                        let _permit = permit;
                        origin.search(&query, predicate.as_deref(), limit)
                    });
                    match tokio::time::timeout(Duration::from_millis(timeout_ms), task).await {
                        Ok(Ok(Ok(hits))) => Ok(hits),
                        Ok(Ok(Err(e))) => Err(e.to_string()),
                        Ok(Err(e)) => Err(format!("origin task failed: {e}")),
                        Err(_) => Err(format!("timed out after {timeout_ms}ms")),
                    }
                }
            },
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        debug!(origin = %name, elapsed_ms, ok = result.is_ok(), "origin finished");
        OriginOutcome {
            origin: name,
            weight,
            elapsed_ms,
            result,
        }
    }
}
