//! OpenAI fine-tuning implementation.
//!
//! This module provides an implementation of the `FineTuningApi` trait for OpenAI's
//! files, fine-tuning jobs and models endpoints.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, error};
use tuner_abstraction::{
    normalize_id, ApiError, ApiResult, CreateJobRequest, FileObject, FineTuningApi, FineTuningJob,
    JobEvent, ListPage, ModelDeletion,
};

/// Default base URL for the OpenAI API.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Purpose tag OpenAI requires on training file uploads.
const FINE_TUNE_PURPOSE: &str = "fine-tune";

/// OpenAI fine-tuning client.
#[derive(Debug, Clone)]
pub struct OpenAIFineTuning {
    /// The API key for authentication.
    api_key: String,
    /// Organization id sent as `OpenAI-Organization`, if any.
    organization: Option<String>,
    /// The base URL for the OpenAI API.
    base_url: String,
    /// HTTP client for making requests.
    client: Client,
}

impl OpenAIFineTuning {
    /// Creates a client with an explicit API key.
    #[must_use]
    pub fn with_api_key(api_key: String) -> Self {
        Self {
            api_key,
            organization: None,
            base_url: OPENAI_API_BASE.to_string(),
            client: Client::new(),
        }
    }

    #[must_use]
    pub fn with_organization(mut self, organization: Option<String>) -> Self {
        self.organization = organization;
        self
    }

    /// Points the client at a different API root (proxies, test servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.bearer_auth(&self.api_key);
        match &self.organization {
            Some(org) => builder.header("OpenAI-Organization", org),
            None => builder,
        }
    }

    /// Sends a request once and decodes a successful JSON body.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, operation: &str) -> ApiResult<T> {
        let response = self.authorized(builder).send().await.map_err(|e| {
            error!(operation, error = %e, "Failed to send request to OpenAI API");
            ApiError::Request(format!("Network error: {}", e))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(operation, error = %e, "Failed to read OpenAI API response");
            ApiError::Request(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(operation, status = %status, error = %body, "OpenAI API returned error status");
            return Err(ApiError::Api { status: status.as_u16(), body });
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(operation, error = %e, "Failed to parse OpenAI API response");
            ApiError::Serialization(format!("Failed to parse response: {}", e))
        })
    }
}

/// Normalizes an id destined for a URL path and rejects empty ones.
fn path_id(raw: &str, what: &str) -> ApiResult<String> {
    let id = normalize_id(raw);
    if id.is_empty() {
        return Err(ApiError::InvalidRequest(format!("{what} id is required")));
    }
    if id.contains('/') {
        return Err(ApiError::InvalidRequest(format!("invalid {what} id: {id}")));
    }
    Ok(id)
}

#[async_trait]
impl FineTuningApi for OpenAIFineTuning {
    async fn upload_file(&self, path: &Path) -> ApiResult<FileObject> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::Request(format!("Failed to read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map_or_else(|| "training.jsonl".to_string(), |n| n.to_string_lossy().to_string());

        debug!(file = %file_name, bytes = bytes.len(), "Uploading training file");

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/jsonl")
            .map_err(|e| ApiError::Request(format!("Invalid upload part: {}", e)))?;
        let form = Form::new().text("purpose", FINE_TUNE_PURPOSE).part("file", part);

        self.send(self.client.post(self.url("/files")).multipart(form), "upload_file").await
    }

    async fn create_job(&self, request: &CreateJobRequest) -> ApiResult<FineTuningJob> {
        request.validate()?;
        debug!(
            training_file = %request.training_file,
            model = %request.model,
            "Creating fine-tuning job"
        );

        self.send(self.client.post(self.url("/fine_tuning/jobs")).json(request), "create_job").await
    }

    async fn get_job(&self, job_id: &str) -> ApiResult<FineTuningJob> {
        let id = path_id(job_id, "job")?;
        debug!(job_id = %id, "Retrieving fine-tuning job");

        self.send(self.client.get(self.url(&format!("/fine_tuning/jobs/{id}"))), "get_job").await
    }

    async fn list_jobs(&self, limit: u32) -> ApiResult<ListPage<FineTuningJob>> {
        debug!(limit, "Listing fine-tuning jobs");
        let builder = self.client.get(self.url("/fine_tuning/jobs")).query(&[("limit", limit)]);

        self.send(builder, "list_jobs").await
    }

    async fn cancel_job(&self, job_id: &str) -> ApiResult<FineTuningJob> {
        let id = path_id(job_id, "job")?;
        debug!(job_id = %id, "Cancelling fine-tuning job");

        self.send(self.client.post(self.url(&format!("/fine_tuning/jobs/{id}/cancel"))), "cancel_job")
            .await
    }

    async fn list_events(&self, job_id: &str, limit: u32) -> ApiResult<ListPage<JobEvent>> {
        let id = path_id(job_id, "job")?;
        debug!(job_id = %id, limit, "Listing fine-tuning job events");
        let builder = self
            .client
            .get(self.url(&format!("/fine_tuning/jobs/{id}/events")))
            .query(&[("limit", limit)]);

        self.send(builder, "list_events").await
    }

    async fn delete_model(&self, model_id: &str) -> ApiResult<ModelDeletion> {
        let id = normalize_id(model_id);
        if id.is_empty() {
            return Err(ApiError::InvalidRequest("model id is required".to_string()));
        }
        debug!(model_id = %id, "Deleting fine-tuned model");

        self.send(self.client.delete(self.url(&format!("/models/{id}"))), "delete_model").await
    }
}
