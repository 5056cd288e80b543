//! Structured log events for pipeline milestones.

/// An origin failed or timed out and contributed nothing.
pub fn origin_degraded(origin: &str, reason: &str, elapsed_ms: u64) {
    tracing::warn!(
        event = "origin_degraded",
        origin = %origin,
        reason = %reason,
        elapsed_ms = elapsed_ms,
        "origin degraded"
    );
}

pub fn search_completed(fused: usize, returned: usize, degraded: usize, elapsed_ms: u64) {
    tracing::info!(
        event = "search_completed",
        fused = fused,
        returned = returned,
        degraded = degraded,
        elapsed_ms = elapsed_ms,
        "search completed"
    );
}

pub fn optimization_completed(
    input_items: usize,
    output_items: usize,
    input_tokens: usize,
    output_tokens: usize,
    reduction_pct: f64,
) {
    tracing::info!(
        event = "optimization_completed",
        input_items = input_items,
        output_items = output_items,
        input_tokens = input_tokens,
        output_tokens = output_tokens,
        reduction_pct = reduction_pct,
        "optimization completed"
    );
}

/// The embedding oracle failed during `stage`; a heuristic was used.
pub fn oracle_degraded(stage: &str, reason: &str) {
    tracing::warn!(
        event = "oracle_degraded",
        stage = %stage,
        reason = %reason,
        "embedding oracle degraded, using heuristic fallback"
    );
}
