//! Stage 2: drop items too short or too repetitive to carry information.

use rayon::prelude::*;
use recall_core::config::OptimizationBudget;
use recall_core::models::{ContextItem, LowInformationStageCounts};

use crate::text::normalized_entropy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rejection {
    TooShort,
    LowEntropy,
}

/// Why `text` would be dropped by this stage, if at all.
pub(crate) fn check(text: &str, budget: &OptimizationBudget) -> Result<(), Rejection> {
    let trimmed = text.trim();
    if trimmed.chars().count() < budget.min_length {
        return Err(Rejection::TooShort);
    }
    if normalized_entropy(trimmed) < budget.entropy_threshold {
        return Err(Rejection::LowEntropy);
    }
    Ok(())
}

pub(crate) fn filter(
    items: Vec<ContextItem>,
    budget: &OptimizationBudget,
    counts: &mut LowInformationStageCounts,
) -> Vec<ContextItem> {
    let verdicts: Vec<Result<(), Rejection>> =
        items.par_iter().map(|item| check(&item.text, budget)).collect();

    items
        .into_iter()
        .zip(verdicts)
        .filter_map(|(item, verdict)| match verdict {
            Ok(()) => Some(item),
            Err(Rejection::TooShort) => {
                counts.too_short += 1;
                None
            }
            Err(Rejection::LowEntropy) => {
                counts.low_entropy += 1;
                None
            }
        })
        .collect()
}
