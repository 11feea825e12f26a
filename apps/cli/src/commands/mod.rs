//! Command implementations for the Tuner CLI.

pub mod dataset;
pub mod files;
pub mod guide;
pub mod jobs;
pub mod models;
pub mod output;
pub mod settings;
pub mod types;

// Re-export types for convenience
pub use types::{DatasetCommand, FilesCommand, JobsCommand, ModelsCommand, SettingsCommand};

use anyhow::Result;
use tuner_core::{SessionError, Settings};
use tuner_models::OpenAIFineTuning;

/// Build the API client from the resolved settings.
pub fn api_client(settings: &Settings) -> Result<OpenAIFineTuning> {
    let api_key = settings.api_key.clone().ok_or(SessionError::MissingApiKey)?;

    let mut client = OpenAIFineTuning::with_api_key(api_key).with_organization(settings.organization.clone());
    if let Some(base) = &settings.api_base {
        client = client.with_base_url(base.clone());
    }
    Ok(client)
}
