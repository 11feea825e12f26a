//! Tuner Training
//!
//! Dataset primitives for chat fine-tuning:
//! - Authoring examples and appending them to a JSON Lines dataset
//! - Structural checks against the provider's chat format
//! - Token accounting and distribution statistics
//! - A rendered validation report with a training cost estimate

pub mod cost;
pub mod dataset;
pub mod error;
pub mod format;
pub mod jsonl;
pub mod report;
pub mod stats;
pub mod tokens;

pub use cost::{CostEstimate, MAX_TOKENS_PER_EXAMPLE};
pub use dataset::{
    compute_dataset_id, ChatTurn, DatasetId, RawDataset, Role, TrainingExample,
    DEFAULT_SYSTEM_MESSAGE,
};
pub use error::{TrainingError, TrainingResult};
pub use format::{check_example, check_examples, FormatErrorKind, FormatErrors};
pub use jsonl::{append_example, load_dataset, parse_jsonl, read_jsonl_dataset, LoadOutcome};
pub use report::{DatasetValidator, ValidationReport};
pub use stats::Distribution;
pub use tokens::{Cl100kCounter, ExampleTokens, TokenCounter};
