//! Tuner CLI - assemble, validate and upload chat fine-tuning datasets
//!
//! This CLI provides a `tuner` command that appends examples to a JSON Lines
//! dataset, checks it before upload, and drives fine-tuning jobs on the
//! provider's API.

mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use tuner_core::{SessionContext, Settings};

use commands::{dataset, files, guide, jobs, models, settings};
use commands::{DatasetCommand, FilesCommand, JobsCommand, ModelsCommand, SettingsCommand};

/// Tuner CLI - chat fine-tuning dataset toolkit
///
/// Tuner builds a training dataset one example at a time, reports format
/// errors and token statistics, and manages uploads and fine-tuning jobs.
#[derive(Parser, Debug)]
#[command(
    name = "tuner",
    author,
    version,
    about = "Tuner - build, validate and train on chat fine-tuning datasets",
    long_about = "Tuner assembles chat fine-tuning datasets in JSON Lines format.\nIt validates them against the provider's chat format, estimates training cost, and manages uploads and fine-tuning jobs."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage API credentials and defaults
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Author and validate the training dataset
    ///
    /// Appends system/user/assistant examples to a JSON Lines file and reports
    /// format errors, token distributions and the expected training cost.
    #[command(subcommand)]
    Dataset(DatasetCommand),

    /// Upload dataset files
    #[command(subcommand)]
    Files(FilesCommand),

    /// Create and inspect fine-tuning jobs
    #[command(subcommand)]
    Jobs(JobsCommand),

    /// Manage fine-tuned models
    #[command(subcommand)]
    Models(ModelsCommand),

    /// Show the end-to-end fine-tuning workflow
    Guide,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let loaded = Settings::discover();

    // Initialize tracing
    let level = args.log_level.as_deref().or(loaded.log_level.as_deref()).map_or(Level::INFO, parse_level);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // If no command provided, show help
    let command = if let Some(cmd) = args.command {
        cmd
    } else {
        Args::command().print_help()?;
        return Ok(());
    };

    // Execute command. Only files and jobs touch session state.
    match command {
        Command::Settings(cmd) => {
            settings::execute(&loaded, cmd)?;
        }
        Command::Dataset(cmd) => {
            dataset::execute(&loaded, cmd)?;
        }
        Command::Files(cmd) => {
            let mut session = SessionContext::open(loaded);
            files::execute(&mut session, cmd).await?;
        }
        Command::Jobs(cmd) => {
            let mut session = SessionContext::open(loaded);
            jobs::execute(&mut session, cmd).await?;
        }
        Command::Models(cmd) => {
            models::execute(&loaded, cmd).await?;
        }
        Command::Guide => {
            guide::execute(&loaded);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_level_defaults_to_info() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("error"), Level::ERROR);
        assert_eq!(parse_level("loud"), Level::INFO);
    }

    #[test]
    fn test_jobs_create_flags_parse() {
        let args = Args::try_parse_from([
            "tuner", "jobs", "create", "--training-file", "file-1", "--suffix", "bot", "--epochs", "2",
        ])
        .unwrap();
        match args.command {
            Some(Command::Jobs(JobsCommand::Create { training_file, suffix, epochs, model, .. })) => {
                assert_eq!(training_file.as_deref(), Some("file-1"));
                assert_eq!(suffix.as_deref(), Some("bot"));
                assert_eq!(epochs, Some(2));
                assert!(model.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_log_level_is_global() {
        let args = Args::try_parse_from(["tuner", "dataset", "validate", "--log-level", "debug"]).unwrap();
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }
}
