//! Dataset command implementation.

use super::output::success;
use super::types::DatasetCommand;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use tracing::info;
use tuner_core::Settings;
use tuner_training::{Cl100kCounter, DatasetValidator, TrainingExample, ValidationReport, append_example};

/// Execute the dataset command.
pub fn execute(settings: &Settings, command: DatasetCommand) -> Result<()> {
    match command {
        DatasetCommand::Append { user, assistant, system, dataset, validate } => {
            let path = dataset.unwrap_or_else(|| settings.dataset_path());
            append(&path, system.as_deref(), &user, &assistant)?;
            if validate {
                println!();
                print_report(&validate_file(&path)?, false)?;
            }
            Ok(())
        }
        DatasetCommand::Validate { dataset, json } => {
            let path = dataset.unwrap_or_else(|| settings.dataset_path());
            print_report(&validate_file(&path)?, json)
        }
    }
}

fn append(path: &Path, system: Option<&str>, user: &str, assistant: &str) -> Result<()> {
    let example = TrainingExample::from_turns(system, user, assistant).context("Invalid example")?;
    append_example(path, &example)
        .with_context(|| format!("Failed to append example to {}", path.display()))?;

    info!(path = %path.display(), "Appended example");
    success(&format!("Example appended to {}", path.display()));
    Ok(())
}

/// Validate the dataset as it currently exists on disk.
fn validate_file(path: &Path) -> Result<ValidationReport> {
    let counter = Cl100kCounter::new().context("Failed to load the cl100k_base tokenizer")?;
    Ok(DatasetValidator::new(&counter).validate_file(path))
}

fn print_report(report: &ValidationReport, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("{}", "Dataset validation".bold().cyan());
    println!();
    print!("{}", report);
    if report.num_examples > 0 && report.is_valid() {
        println!();
        success("Dataset is ready for upload");
    }
    Ok(())
}
