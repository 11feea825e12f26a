//! Models command implementation.

use super::output::print_json;
use super::types::ModelsCommand;
use super::api_client;
use anyhow::{Context, Result};
use tuner_abstraction::{FineTuningApi, normalize_id};
use tuner_core::Settings;

/// Execute the models command.
pub async fn execute(settings: &Settings, command: ModelsCommand) -> Result<()> {
    match command {
        ModelsCommand::Delete { model_id } => {
            let client = api_client(settings)?;
            let model_id = normalize_id(&model_id);
            let deletion = client
                .delete_model(&model_id)
                .await
                .with_context(|| format!("Failed to delete model {}", model_id))?;
            print_json("Deleted model", &deletion)
        }
    }
}
