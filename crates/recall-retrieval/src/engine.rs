//! RetrievalEngine: search → record materialization → context optimization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use recall_core::config::OptimizationBudget;
use recall_core::errors::{RecallResult, RetrievalError};
use recall_core::models::{ContextItem, FusedResult, OptimizationReport, Record, SearchMetrics};
use recall_core::traits::IRecordStore;
use recall_observability::{QueryLog, QueryLogEntry};
use recall_optimizer::ContextOptimizer;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::search::{HybridSearcher, SearchRequest};

/// Everything one `retrieve` call produced.
#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    /// Optimized context, in fused rank order.
    pub items: Vec<ContextItem>,
    /// Fused results before materialization.
    pub results: Vec<FusedResult>,
    pub metrics: SearchMetrics,
    pub report: OptimizationReport,
    /// Fused ids the record store could not find.
    pub missing_records: usize,
}

pub struct RetrievalEngine {
    searcher: HybridSearcher,
    store: Arc<dyn IRecordStore>,
    optimizer: ContextOptimizer,
    log: Mutex<QueryLog>,
}

impl RetrievalEngine {
    pub fn new(searcher: HybridSearcher, store: Arc<dyn IRecordStore>) -> Self {
        Self {
            searcher,
            store,
            optimizer: ContextOptimizer::new(),
            log: Mutex::new(QueryLog::default()),
        }
    }

    pub fn with_optimizer(mut self, optimizer: ContextOptimizer) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn with_query_log_capacity(mut self, capacity: usize) -> Self {
        self.log = Mutex::new(QueryLog::with_capacity(capacity));
        self
    }

    pub fn searcher(&self) -> &HybridSearcher {
        &self.searcher
    }

    /// Snapshot of the call log.
    pub fn query_log(&self) -> QueryLog {
        match self.log.lock() {
            Ok(log) => log.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, entry: QueryLogEntry) {
        match self.log.lock() {
            Ok(mut log) => log.record(entry),
            Err(poisoned) => poisoned.into_inner().record(entry),
        }
    }

    /// Search, materialize the fused ids, then optimize them for `budget`.
    pub async fn retrieve(
        &self,
        request: &SearchRequest,
        budget: &OptimizationBudget,
        cancel: &CancellationToken,
    ) -> RecallResult<RetrievalOutcome> {
        budget.validate()?;

        let (results, metrics) = self.searcher.search(request, cancel).await?;
        self.record(QueryLogEntry::search(&request.query, &metrics, results.len()));
        ensure_live(cancel)?;

        let (items, missing_records) = self.materialize(&results).await?;
        if missing_records > 0 {
            warn!(missing = missing_records, "fused ids missing from record store");
        }
        ensure_live(cancel)?;

        let started = Instant::now();
        let optimizer = self.optimizer.clone();
        let query = request.query.clone();
        let budget = budget.clone();
        let (items, report) =
            tokio::task::spawn_blocking(move || optimizer.optimize(items, &query, &budget))
                .await
                .map_err(|e| RetrievalError::TaskFailed {
                    reason: e.to_string(),
                })?;
        self.record(QueryLogEntry::optimize(&request.query, &report, started.elapsed()));

        debug!(
            fused = results.len(),
            kept = items.len(),
            missing = missing_records,
            "retrieval finished"
        );
        Ok(RetrievalOutcome {
            items,
            results,
            metrics,
            report,
            missing_records,
        })
    }

    /// Fetch full records for `results`, keeping fused order.
    async fn materialize(&self, results: &[FusedResult]) -> RecallResult<(Vec<ContextItem>, usize)> {
        let ids: Vec<String> = results.iter().map(|r| r.id.clone()).collect();
        let store = Arc::clone(&self.store);
        let records = tokio::task::spawn_blocking(move || store.get_bulk(&ids))
            .await
            .map_err(|e| RetrievalError::TaskFailed {
                reason: e.to_string(),
            })?
            .map_err(|e| RetrievalError::RecordStoreFailed {
                reason: e.to_string(),
            })?;

        let mut by_id: HashMap<String, Record> =
            records.into_iter().map(|r| (r.id.clone(), r)).collect();
        let mut missing = 0;
        let mut items = Vec::with_capacity(results.len());
        for result in results {
            match by_id.remove(&result.id) {
                Some(record) => items.push(
                    ContextItem::new(record.id, record.text, result.best_origin().unwrap_or_default())
                        .with_relevance(result.fused_score),
                ),
                None => missing += 1,
            }
        }
        Ok((items, missing))
    }
}

fn ensure_live(cancel: &CancellationToken) -> RecallResult<()> {
    if cancel.is_cancelled() {
        return Err(RetrievalError::Cancelled.into());
    }
    Ok(())
}
