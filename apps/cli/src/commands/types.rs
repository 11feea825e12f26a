//! Command type definitions shared between main.rs and the command handlers.

use clap::Subcommand;
use std::path::PathBuf;
use tuner_abstraction::DEFAULT_LIST_LIMIT;

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Save API credentials and defaults
    ///
    /// Values are merged into the local settings file (./.tunerrc), or the
    /// global one (~/.tuner/settings.toml) with --global.
    Set {
        /// API key for the fine-tuning provider
        #[arg(long)]
        api_key: Option<String>,

        /// Organization id
        #[arg(long)]
        org_id: Option<String>,

        /// API root override (e.g. a proxy)
        #[arg(long)]
        api_base: Option<String>,

        /// Default base model for new jobs
        #[arg(long)]
        model: Option<String>,

        /// Default dataset file
        #[arg(long)]
        dataset: Option<String>,

        /// Write to the global settings file instead of ./.tunerrc
        #[arg(long)]
        global: bool,
    },

    /// Show the effective settings (API key masked)
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum DatasetCommand {
    /// Append one system/user/assistant example to the dataset
    Append {
        /// The user prompt
        #[arg(long)]
        user: String,

        /// The ideal assistant response
        #[arg(long)]
        assistant: String,

        /// Custom system message (defaults to a helpful-assistant prompt)
        #[arg(long)]
        system: Option<String>,

        /// Dataset file (defaults to the configured dataset or output.jsonl)
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Validate the dataset after appending
        #[arg(long)]
        validate: bool,
    },

    /// Check the dataset format and print token statistics
    Validate {
        /// Dataset file (defaults to the configured dataset or output.jsonl)
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum FilesCommand {
    /// Upload a dataset for fine-tuning
    Upload {
        /// File to upload (defaults to the configured dataset or output.jsonl)
        path: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum JobsCommand {
    /// Create a fine-tuning job
    Create {
        /// Training file id (defaults to the last uploaded file)
        #[arg(long)]
        training_file: Option<String>,

        /// Base model (defaults to the configured model or gpt-3.5-turbo-0613)
        #[arg(long)]
        model: Option<String>,

        /// Validation file id
        #[arg(long)]
        validation_file: Option<String>,

        /// Suffix for the fine-tuned model name (up to 18 characters)
        #[arg(long)]
        suffix: Option<String>,

        /// Number of epochs (provider default if omitted)
        #[arg(long)]
        epochs: Option<u32>,
    },

    /// List recent fine-tuning jobs
    List {
        /// Maximum number of jobs
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: u32,
    },

    /// Retrieve the state of a fine-tuning job
    Get {
        /// Job id (defaults to the last created job)
        job_id: Option<String>,
    },

    /// Cancel a fine-tuning job
    Cancel {
        /// Job id (defaults to the last created job)
        job_id: Option<String>,
    },

    /// List events from a fine-tuning job
    Events {
        /// Job id (defaults to the last created job)
        job_id: Option<String>,

        /// Maximum number of events
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: u32,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ModelsCommand {
    /// Delete a fine-tuned model
    Delete {
        /// Fine-tuned model id
        model_id: String,
    },
}
