mod candidate;
mod compiled_predicate;
mod context_item;
mod degradation_event;
mod fused_result;
mod optimization_report;
mod record;
mod search_metrics;

pub use candidate::RankedCandidate;
pub use compiled_predicate::CompiledPredicate;
pub use context_item::{ContextItem, ItemFlags};
pub use degradation_event::DegradationEvent;
pub use fused_result::{FusedResult, OriginContribution};
pub use optimization_report::{
    BudgetStageCounts, CompressionStageCounts, DedupStageCounts, LowInformationStageCounts,
    OptimizationReport, RelevanceStageCounts,
};
pub use record::Record;
pub use search_metrics::{DegradedOrigin, SearchMetrics};
