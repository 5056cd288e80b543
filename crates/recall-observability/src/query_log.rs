//! Call performance log: query, latency, result counts, degraded origins, tokens in/out.

use std::collections::VecDeque;
use std::time::Duration;

use recall_core::models::{OptimizationReport, SearchMetrics};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Search,
    Optimize,
}

/// A single logged call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogEntry {
    pub kind: CallKind,
    pub query: String,
    pub latency: Duration,
    pub result_count: usize,
    pub degraded_origins: Vec<String>,
    pub tokens_in: usize,
    pub tokens_out: usize,
    pub timestamp_epoch_ms: i64,
}

impl QueryLogEntry {
    pub fn search(query: impl Into<String>, metrics: &SearchMetrics, result_count: usize) -> Self {
        Self {
            kind: CallKind::Search,
            query: query.into(),
            latency: Duration::from_millis(metrics.elapsed_ms),
            result_count,
            degraded_origins: metrics
                .degraded_origins
                .iter()
                .map(|d| d.origin.clone())
                .collect(),
            tokens_in: 0,
            tokens_out: 0,
            timestamp_epoch_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn optimize(query: impl Into<String>, report: &OptimizationReport, latency: Duration) -> Self {
        Self {
            kind: CallKind::Optimize,
            query: query.into(),
            latency,
            result_count: report.output_items,
            degraded_origins: Vec::new(),
            tokens_in: report.input_tokens,
            tokens_out: report.output_tokens,
            timestamp_epoch_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Bounded log; the oldest entries are evicted first.
#[derive(Debug, Clone)]
pub struct QueryLog {
    entries: VecDeque<QueryLogEntry>,
    max_entries: usize,
}

impl Default for QueryLog {
    fn default() -> Self {
        Self::with_capacity(recall_core::config::defaults::DEFAULT_QUERY_LOG_CAPACITY)
    }
}

impl QueryLog {
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn record(&mut self, entry: QueryLogEntry) {
        tracing::debug!(
            event = "query_logged",
            kind = ?entry.kind,
            query = %entry.query,
            latency_ms = entry.latency.as_millis() as u64,
            result_count = entry.result_count,
            degraded = entry.degraded_origins.len(),
            "query logged"
        );

        self.entries.push_back(entry);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &QueryLogEntry> {
        self.entries.iter()
    }

    fn latencies(&self, kind: Option<CallKind>) -> Vec<Duration> {
        self.entries
            .iter()
            .filter(|e| kind.map_or(true, |k| e.kind == k))
            .map(|e| e.latency)
            .collect()
    }

    /// Average latency, optionally restricted to one call kind.
    pub fn avg_latency(&self, kind: Option<CallKind>) -> Duration {
        let latencies = self.latencies(kind);
        if latencies.is_empty() {
            return Duration::ZERO;
        }
        latencies.iter().sum::<Duration>() / latencies.len() as u32
    }

    /// Latency at percentile `p` in [0, 1] (nearest rank).
    pub fn latency_percentile(&self, kind: Option<CallKind>, p: f64) -> Duration {
        let mut latencies = self.latencies(kind);
        if latencies.is_empty() {
            return Duration::ZERO;
        }
        latencies.sort();
        let last = latencies.len() - 1;
        let idx = ((p.clamp(0.0, 1.0) * last as f64).round() as usize).min(last);
        latencies[idx]
    }

    /// Fraction of logged searches that had at least one degraded origin.
    pub fn degraded_search_rate(&self) -> f64 {
        let searches: Vec<&QueryLogEntry> = self
            .entries
            .iter()
            .filter(|e| e.kind == CallKind::Search)
            .collect();
        if searches.is_empty() {
            return 0.0;
        }
        let degraded = searches.iter().filter(|e| !e.degraded_origins.is_empty()).count();
        degraded as f64 / searches.len() as f64
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }
}
