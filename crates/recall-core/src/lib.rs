//! # recall-core
//!
//! Foundation crate for the recall context pipeline.
//! Defines the shared models, collaborator traits, errors, config, and defaults.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::{OptimizationBudget, RecallConfig, RetrievalConfig};
pub use errors::{RecallError, RecallResult};
pub use models::{
    CompiledPredicate, ContextItem, FusedResult, ItemFlags, OptimizationReport, RankedCandidate,
    Record, SearchMetrics,
};
