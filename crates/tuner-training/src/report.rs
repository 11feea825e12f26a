//! The dataset validator and the report it produces.

use crate::cost::{self, CostEstimate, MAX_TOKENS_PER_EXAMPLE};
use crate::dataset::{compute_dataset_id, DatasetId, Role};
use crate::format::{check_example, messages_of, role_of, FormatErrors};
use crate::jsonl::{load_dataset, LoadOutcome};
use crate::stats::Distribution;
use crate::tokens::{count_example_tokens, TokenCounter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Write as _};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub num_examples: usize,
    /// First record in input order, shown as a sample.
    pub first_example: Option<Value>,
    pub dataset_id: Option<DatasetId>,
    pub format_errors: FormatErrors,
    /// Records that tripped at least one error category.
    pub invalid_examples: usize,
    pub missing_system: usize,
    pub missing_user: usize,
    pub messages_per_example: Option<Distribution>,
    pub total_tokens_per_example: Option<Distribution>,
    pub assistant_tokens_per_example: Option<Distribution>,
    pub over_token_limit: usize,
    pub cost: Option<CostEstimate>,
}

impl ValidationReport {
    /// Report for a dataset with nothing in it.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.format_errors.is_empty()
    }
}

/// Checks a dataset snapshot and summarizes its token usage.
pub struct DatasetValidator<'a> {
    counter: &'a dyn TokenCounter,
}

impl<'a> DatasetValidator<'a> {
    #[must_use]
    pub fn new(counter: &'a dyn TokenCounter) -> Self {
        Self { counter }
    }

    /// Validate records already in memory. The input is never modified.
    #[must_use]
    pub fn validate(&self, examples: &[Value]) -> ValidationReport {
        if examples.is_empty() {
            return ValidationReport::empty();
        }

        let mut report = ValidationReport {
            num_examples: examples.len(),
            first_example: examples.first().cloned(),
            dataset_id: Some(compute_dataset_id(examples)),
            ..ValidationReport::default()
        };

        let mut message_counts = Vec::new();
        let mut total_tokens = Vec::new();
        let mut assistant_tokens = Vec::new();

        for example in examples {
            let errors = check_example(example);
            if !errors.is_empty() {
                report.invalid_examples += 1;
            }
            report.format_errors.extend(errors);

            let Some(messages) = messages_of(example) else {
                continue;
            };
            if !messages.iter().any(|m| role_of(m) == Some(Role::System)) {
                report.missing_system += 1;
            }
            if !messages.iter().any(|m| role_of(m) == Some(Role::User)) {
                report.missing_user += 1;
            }

            let tokens = count_example_tokens(messages, self.counter);
            message_counts.push(tokens.messages);
            total_tokens.push(tokens.total);
            assistant_tokens.push(tokens.assistant);
        }

        report.messages_per_example = Distribution::from_counts(&message_counts);
        report.total_tokens_per_example = Distribution::from_counts(&total_tokens);
        report.assistant_tokens_per_example = Distribution::from_counts(&assistant_tokens);
        report.over_token_limit = cost::examples_over_limit(&total_tokens);
        report.cost = cost::estimate(&total_tokens);

        debug!(
            examples = report.num_examples,
            invalid = report.invalid_examples,
            errors = report.format_errors.total(),
            "validated dataset"
        );
        report
    }

    /// Load `path` fresh and validate it. Missing or malformed files yield an empty report.
    #[must_use]
    pub fn validate_file(&self, path: &Path) -> ValidationReport {
        match load_dataset(path) {
            LoadOutcome::Loaded(examples) => self.validate(&examples),
            LoadOutcome::Missing | LoadOutcome::Malformed { .. } => ValidationReport::empty(),
        }
    }
}

fn fmt_stat(value: f64) -> String {
    if value.fract() == 0.0 { format!("{value:.0}") } else { format!("{value:.2}") }
}

fn write_distribution(out: &mut String, name: &str, dist: Option<&Distribution>) -> fmt::Result {
    let Some(dist) = dist else {
        return Ok(());
    };
    writeln!(out)?;
    writeln!(out, "#### Distribution of {name}:")?;
    writeln!(out, "min / max: {}, {}", fmt_stat(dist.min), fmt_stat(dist.max))?;
    writeln!(out, "mean / median: {}, {}", fmt_stat(dist.mean), fmt_stat(dist.median))?;
    writeln!(out, "p5 / p95: {}, {}", fmt_stat(dist.p5), fmt_stat(dist.p95))
}

fn render(report: &ValidationReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "Num examples: {}", report.num_examples)?;

    if report.num_examples == 0 {
        writeln!(out, "No examples found; nothing to validate.")?;
        return Ok(out);
    }

    if let Some(first) = &report.first_example {
        writeln!(out, "First example:")?;
        match messages_of(first) {
            Some(messages) => {
                for message in messages {
                    writeln!(out, "{message}")?;
                }
            }
            None => writeln!(out, "{first}")?,
        }
    }
    if let Some(id) = &report.dataset_id {
        writeln!(out, "Dataset fingerprint: {id}")?;
    }

    writeln!(out)?;
    if report.format_errors.is_empty() {
        writeln!(out, "No errors found")?;
    } else {
        writeln!(out, "Found errors:")?;
        for (kind, count) in report.format_errors.iter() {
            writeln!(out, "{}: {count}", kind.key())?;
        }
        writeln!(out, "{} of {} examples have errors", report.invalid_examples, report.num_examples)?;
    }

    writeln!(out)?;
    writeln!(out, "Num examples missing system message: {}", report.missing_system)?;
    writeln!(out, "Num examples missing user message: {}", report.missing_user)?;

    write_distribution(&mut out, "num_messages_per_example", report.messages_per_example.as_ref())?;
    write_distribution(&mut out, "num_total_tokens_per_example", report.total_tokens_per_example.as_ref())?;
    write_distribution(
        &mut out,
        "num_assistant_tokens_per_example",
        report.assistant_tokens_per_example.as_ref(),
    )?;

    if let Some(cost) = &report.cost {
        writeln!(out)?;
        writeln!(
            out,
            "{} examples may be over the {MAX_TOKENS_PER_EXAMPLE} token limit, they will be truncated during fine-tuning",
            report.over_token_limit
        )?;
        writeln!(out, "Dataset has ~{} tokens that will be charged for during training", cost.billable_tokens)?;
        writeln!(out, "By default, you'll train for {} epochs on this dataset", cost.epochs)?;
        writeln!(out, "By default, you'll be charged for ~{} tokens", cost.charged_tokens)?;
    }

    Ok(out)
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self)?)
    }
}
