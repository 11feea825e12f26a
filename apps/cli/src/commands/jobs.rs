//! Jobs command implementation.

use super::output::{print_json, success};
use super::types::JobsCommand;
use super::api_client;
use anyhow::{Context, Result};
use tracing::info;
use tuner_abstraction::{CreateJobRequest, DEFAULT_BASE_MODEL, FineTuningApi, normalize_id};
use tuner_core::SessionContext;

/// Execute the jobs command.
pub async fn execute(session: &mut SessionContext, command: JobsCommand) -> Result<()> {
    let client = api_client(session.settings())?;
    run(session, &client, command).await
}

/// Run a jobs command against `api`.
pub async fn run(session: &mut SessionContext, api: &dyn FineTuningApi, command: JobsCommand) -> Result<()> {
    match command {
        JobsCommand::Create { training_file, model, validation_file, suffix, epochs } => {
            let training_file = session.resolve_training_file(training_file.as_deref())?;
            let model = model
                .or_else(|| session.settings().model.clone())
                .unwrap_or_else(|| DEFAULT_BASE_MODEL.to_string());

            let mut request = CreateJobRequest::new(training_file).with_model(model);
            request.validation_file = validation_file.map(|id| normalize_id(&id));
            request.suffix = suffix;
            request.hyperparameters.n_epochs = epochs;
            request.validate()?;

            info!(training_file = %request.training_file, model = %request.model, "Creating fine-tuning job");
            let job = api.create_job(&request).await.context("Failed to create fine-tuning job")?;
            session.record_job(&job.id)?;

            print_json("Fine-tuning job", &job)?;
            success(&format!("Job id {} saved for `tuner jobs get`", job.id));
            Ok(())
        }
        JobsCommand::List { limit } => {
            let page = api.list_jobs(limit).await.context("Failed to list fine-tuning jobs")?;
            print_json(&format!("Fine-tuning jobs ({})", page.data.len()), &page)
        }
        JobsCommand::Get { job_id } => {
            let job_id = session.resolve_job_id(job_id.as_deref())?;
            let job = api.get_job(&job_id).await.with_context(|| format!("Failed to retrieve job {}", job_id))?;
            print_json("Fine-tuning job", &job)
        }
        JobsCommand::Cancel { job_id } => {
            let job_id = session.resolve_job_id(job_id.as_deref())?;
            let job = api.cancel_job(&job_id).await.with_context(|| format!("Failed to cancel job {}", job_id))?;
            print_json("Cancelled fine-tuning job", &job)
        }
        JobsCommand::Events { job_id, limit } => {
            let job_id = session.resolve_job_id(job_id.as_deref())?;
            let events = api
                .list_events(&job_id, limit)
                .await
                .with_context(|| format!("Failed to list events for job {}", job_id))?;
            print_json(&format!("Events for {}", job_id), &events)
        }
    }
}
