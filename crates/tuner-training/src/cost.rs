//! Training cost estimate, using the provider's default epoch heuristic.

use serde::{Deserialize, Serialize};

/// Tokens beyond this per example are truncated during fine-tuning.
pub const MAX_TOKENS_PER_EXAMPLE: usize = 4096;

pub const TARGET_EPOCHS: usize = 3;
pub const MIN_TARGET_EXAMPLES: usize = 100;
pub const MAX_TARGET_EXAMPLES: usize = 25_000;
pub const MIN_DEFAULT_EPOCHS: usize = 1;
pub const MAX_DEFAULT_EPOCHS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Sum of per-example token totals, each capped at [`MAX_TOKENS_PER_EXAMPLE`].
    pub billable_tokens: usize,
    /// Epochs the provider runs by default for this many examples.
    pub epochs: usize,
    /// `epochs * billable_tokens`.
    pub charged_tokens: usize,
}

/// Default epoch count for a dataset of `n_examples`.
///
/// Small datasets get more epochs so roughly [`MIN_TARGET_EXAMPLES`] examples are
/// seen; very large ones get fewer so no more than [`MAX_TARGET_EXAMPLES`] are.
#[must_use]
pub fn default_epochs(n_examples: usize) -> usize {
    if n_examples == 0 {
        return TARGET_EPOCHS;
    }
    let seen = n_examples * TARGET_EPOCHS;
    if seen < MIN_TARGET_EXAMPLES {
        MAX_DEFAULT_EPOCHS.min(MIN_TARGET_EXAMPLES / n_examples)
    } else if seen > MAX_TARGET_EXAMPLES {
        MIN_DEFAULT_EPOCHS.max(MAX_TARGET_EXAMPLES / n_examples)
    } else {
        TARGET_EPOCHS
    }
}

/// Number of examples whose token total exceeds [`MAX_TOKENS_PER_EXAMPLE`].
#[must_use]
pub fn examples_over_limit(total_tokens: &[usize]) -> usize {
    total_tokens.iter().filter(|&&t| t > MAX_TOKENS_PER_EXAMPLE).count()
}

/// Estimate billing for a dataset given each example's token total.
#[must_use]
pub fn estimate(total_tokens: &[usize]) -> Option<CostEstimate> {
    if total_tokens.is_empty() {
        return None;
    }
    let billable_tokens = total_tokens.iter().map(|&t| t.min(MAX_TOKENS_PER_EXAMPLE)).sum();
    let epochs = default_epochs(total_tokens.len());
    Some(CostEstimate { billable_tokens, epochs, charged_tokens: epochs * billable_tokens })
}
