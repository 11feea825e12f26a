//! Files command implementation.

use super::output::{print_json, success};
use super::types::FilesCommand;
use super::api_client;
use anyhow::{Context, Result};
use std::path::Path;
use tuner_abstraction::FineTuningApi;
use tuner_core::SessionContext;
use tuner_training::read_jsonl_dataset;

/// Execute the files command.
pub async fn execute(session: &mut SessionContext, command: FilesCommand) -> Result<()> {
    let client = api_client(session.settings())?;
    run(session, &client, command).await
}

/// Run a files command against `api`.
pub async fn run(session: &mut SessionContext, api: &dyn FineTuningApi, command: FilesCommand) -> Result<()> {
    match command {
        FilesCommand::Upload { path } => {
            let path = session.dataset_path(path.as_deref());
            upload(session, api, &path).await
        }
    }
}

async fn upload(session: &mut SessionContext, api: &dyn FineTuningApi, path: &Path) -> Result<()> {
    let examples = read_jsonl_dataset(path)
        .with_context(|| format!("Cannot upload {}", path.display()))?;
    tracing::info!(path = %path.display(), examples = examples.len(), "Uploading dataset");

    let file = api.upload_file(path).await.context("Upload failed")?;
    session.record_upload(&file.id)?;

    print_json("Uploaded file", &file)?;
    success(&format!("Training file id {} saved for `tuner jobs create`", file.id));
    Ok(())
}
