//! Fine-tuning API abstraction layer for Tuner.
//!
//! This module defines the capability set a hosted fine-tuning provider exposes
//! (file upload and job management) and the request/response types that cross it.
//! Response types keep every field the provider sends so callers can show
//! responses verbatim.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

/// Base model fine-tuning jobs are created against unless told otherwise.
pub const DEFAULT_BASE_MODEL: &str = "gpt-3.5-turbo-0613";

/// Page size used by the list operations unless told otherwise.
pub const DEFAULT_LIST_LIMIT: u32 = 10;

/// Represents an error that can occur when calling the fine-tuning API.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiError {
    /// The request could not be built or sent (network issues, unreadable file).
    #[error("Request Error: {0}")]
    Request(String),

    /// The provider answered with a non-success status. `body` is the raw response text.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("Serialization Error: {0}")]
    Serialization(String),

    /// The request was rejected before being sent.
    #[error("Invalid Request: {0}")]
    InvalidRequest(String),
}

/// Result type for fine-tuning API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Normalize an identifier typed or pasted by a user.
///
/// Surrounding whitespace and double quotes are removed, so `"ftjob-abc"` and
/// `ftjob-abc` name the same job.
#[must_use]
pub fn normalize_id(raw: &str) -> String {
    raw.trim().trim_matches('"').trim().to_string()
}

/// An uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileObject {
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub bytes: Option<u64>,
    /// Remaining provider fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Hyperparameters accepted when creating a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hyperparameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_epochs: Option<u32>,
}

impl Hyperparameters {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n_epochs.is_none()
    }
}

/// Body of a create-job request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateJobRequest {
    /// Id of an uploaded training file.
    pub training_file: String,
    /// Base model to fine-tune.
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_file: Option<String>,
    /// Up to 18 characters appended to the fine-tuned model name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Hyperparameters::is_empty")]
    pub hyperparameters: Hyperparameters,
}

impl CreateJobRequest {
    #[must_use]
    pub fn new(training_file: impl Into<String>) -> Self {
        Self {
            training_file: normalize_id(&training_file.into()),
            model: DEFAULT_BASE_MODEL.to_string(),
            validation_file: None,
            suffix: None,
            hyperparameters: Hyperparameters::default(),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Check the request before it is sent.
    pub fn validate(&self) -> ApiResult<()> {
        if self.training_file.is_empty() {
            return Err(ApiError::InvalidRequest("training_file is required".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(ApiError::InvalidRequest("model is required".to_string()));
        }
        if let Some(suffix) = &self.suffix {
            if suffix.chars().count() > 18 {
                return Err(ApiError::InvalidRequest(
                    "suffix must be at most 18 characters".to_string(),
                ));
            }
        }
        if self.hyperparameters.n_epochs == Some(0) {
            return Err(ApiError::InvalidRequest("n_epochs must be >= 1".to_string()));
        }
        Ok(())
    }
}

/// A fine-tuning job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FineTuningJob {
    pub id: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub fine_tuned_model: Option<String>,
    #[serde(default)]
    pub training_file: Option<String>,
    /// Remaining provider fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One event in a job's log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEvent {
    pub id: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    /// Remaining provider fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A page of a list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    /// Remaining provider fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Confirmation that a model was deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDeletion {
    pub id: String,
    #[serde(default)]
    pub deleted: bool,
    /// Remaining provider fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The operations a hosted fine-tuning provider offers.
///
/// Every call is a single request/response exchange; implementations do not retry.
#[async_trait]
pub trait FineTuningApi: Send + Sync {
    /// Uploads a JSON Lines training file.
    async fn upload_file(&self, path: &Path) -> ApiResult<FileObject>;

    /// Starts a fine-tuning job.
    async fn create_job(&self, request: &CreateJobRequest) -> ApiResult<FineTuningJob>;

    /// Fetches the current state of a job.
    async fn get_job(&self, job_id: &str) -> ApiResult<FineTuningJob>;

    /// Lists the most recent jobs.
    async fn list_jobs(&self, limit: u32) -> ApiResult<ListPage<FineTuningJob>>;

    /// Cancels a running job.
    async fn cancel_job(&self, job_id: &str) -> ApiResult<FineTuningJob>;

    /// Lists the most recent events of a job.
    async fn list_events(&self, job_id: &str, limit: u32) -> ApiResult<ListPage<JobEvent>>;

    /// Deletes a fine-tuned model.
    async fn delete_model(&self, model_id: &str) -> ApiResult<ModelDeletion>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_id_strips_quotes_and_whitespace() {
        assert_eq!(normalize_id("  \"ftjob-abc123\" "), "ftjob-abc123");
        assert_eq!(normalize_id("ftjob-abc123"), "ftjob-abc123");
        assert_eq!(normalize_id("\"\""), "");
    }

    #[test]
    fn test_create_job_request_defaults() {
        let req = CreateJobRequest::new("\"file-xyz\"");
        assert_eq!(req.training_file, "file-xyz");
        assert_eq!(req.model, DEFAULT_BASE_MODEL);
        assert!(req.validate().is_ok());

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body, json!({"training_file": "file-xyz", "model": "gpt-3.5-turbo-0613"}));
    }

    #[test]
    fn test_create_job_request_optional_fields() {
        let mut req = CreateJobRequest::new("file-xyz").with_model("gpt-4o-mini-2024-07-18");
        req.suffix = Some("support-bot".to_string());
        req.hyperparameters.n_epochs = Some(4);

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["suffix"], "support-bot");
        assert_eq!(body["hyperparameters"]["n_epochs"], 4);
        assert!(body.get("validation_file").is_none());
    }

    #[test]
    fn test_create_job_request_validation() {
        assert!(CreateJobRequest::new("  ").validate().is_err());

        let mut req = CreateJobRequest::new("file-1");
        req.suffix = Some("x".repeat(19));
        assert!(matches!(req.validate(), Err(ApiError::InvalidRequest(_))));

        let mut req = CreateJobRequest::new("file-1");
        req.hyperparameters.n_epochs = Some(0);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_job_keeps_unknown_fields() {
        let raw = json!({
            "object": "fine_tuning.job",
            "id": "ftjob-1",
            "model": "gpt-3.5-turbo-0613",
            "status": "running",
            "fine_tuned_model": null,
            "trained_tokens": 1200
        });
        let job: FineTuningJob = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(job.status.as_deref(), Some("running"));
        assert_eq!(job.extra.get("trained_tokens"), Some(&json!(1200)));
        assert_eq!(serde_json::to_value(&job).unwrap()["object"], raw["object"]);
    }

    #[test]
    fn test_list_page_decodes_events() {
        let raw = json!({
            "object": "list",
            "data": [{"object": "fine_tuning.job.event", "id": "ev-1", "level": "info", "message": "Job started", "created_at": 1_692_000_000}],
            "has_more": false
        });
        let page: ListPage<JobEvent> = serde_json::from_value(raw).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].message.as_deref(), Some("Job started"));
        assert!(!page.has_more);
    }

    #[test]
    fn test_api_error_display_carries_raw_body() {
        let err = ApiError::Api { status: 401, body: "{\"error\":\"bad key\"}".to_string() };
        assert_eq!(err.to_string(), "API error (401): {\"error\":\"bad key\"}");
    }
}
