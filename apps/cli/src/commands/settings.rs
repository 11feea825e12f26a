//! Settings command implementation.

use super::output::success;
use super::types::SettingsCommand;
use anyhow::{Context, Result, bail};
use colored::Colorize;
use serde_json::json;
use tuner_core::{Settings, SettingsStore};

/// Execute the settings command.
pub fn execute(settings: &Settings, command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Set { api_key, org_id, api_base, model, dataset, global } => {
            let update = Settings { api_key, organization: org_id, api_base, model, dataset, log_level: None };
            let store = if global { SettingsStore::global() } else { SettingsStore::local() };
            set(&store, &update)
        }
        SettingsCommand::Show { json } => {
            show(settings, json);
            Ok(())
        }
    }
}

fn set(store: &SettingsStore, update: &Settings) -> Result<()> {
    if *update == Settings::default() {
        bail!("Nothing to save. Pass at least one of --api-key, --org-id, --api-base, --model or --dataset");
    }

    let saved = store
        .update(update)
        .with_context(|| format!("Failed to write settings to {}", store.path().display()))?;

    success(&format!("Settings saved to {}", store.path().display()));
    if let Some(masked) = saved.masked_api_key() {
        println!("  API key: {}", masked);
    }
    Ok(())
}

fn show(settings: &Settings, json_output: bool) {
    let masked = settings.masked_api_key();

    if json_output {
        let value = json!({
            "api_key": masked,
            "organization": settings.organization,
            "api_base": settings.api_base,
            "model": settings.model,
            "dataset": settings.dataset_path().display().to_string(),
            "log_level": settings.log_level,
        });
        println!("{}", value);
        return;
    }

    let unset = || "(not set)".dimmed().to_string();
    println!("{}", "Settings".bold().cyan());
    println!("  API key:      {}", masked.unwrap_or_else(unset));
    println!("  Organization: {}", settings.organization.clone().unwrap_or_else(unset));
    println!("  API base:     {}", settings.api_base.clone().unwrap_or_else(unset));
    println!("  Model:        {}", settings.model.clone().unwrap_or_else(unset));
    println!("  Dataset:      {}", settings.dataset_path().display());
}
