//! Request/response checks for the OpenAI fine-tuning client against a mock server.

use mockito::{Matcher, Server};
use serde_json::json;
use tempfile::TempDir;
use tuner_abstraction::{ApiError, CreateJobRequest, FineTuningApi};
use tuner_models::OpenAIFineTuning;

fn client(server: &Server) -> OpenAIFineTuning {
    OpenAIFineTuning::with_api_key("test-key".to_string()).with_base_url(server.url())
}

#[tokio::test]
async fn test_upload_file_sends_multipart_with_purpose() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/files")
        .match_header("authorization", "Bearer test-key")
        .match_header("content-type", Matcher::Regex("multipart/form-data".to_string()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("fine-tune".to_string()),
            Matcher::Regex("output.jsonl".to_string()),
            Matcher::Regex("\"messages\"".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "file-abc123", "object": "file", "bytes": 42, "filename": "output.jsonl", "purpose": "fine-tune"}"#)
        .create_async()
        .await;

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("output.jsonl");
    std::fs::write(&path, "{\"messages\": []}\n").unwrap();

    let file = client(&server).upload_file(&path).await.unwrap();
    assert_eq!(file.id, "file-abc123");
    assert_eq!(file.purpose.as_deref(), Some("fine-tune"));
    assert_eq!(file.extra.get("object"), Some(&json!("file")));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_missing_file_fails_without_request() {
    let server = Server::new_async().await;
    let temp = TempDir::new().unwrap();

    let err = client(&server).upload_file(&temp.path().join("missing.jsonl")).await.unwrap_err();
    assert!(matches!(err, ApiError::Request(_)));
}

#[tokio::test]
async fn test_create_job_posts_json_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/fine_tuning/jobs")
        .match_header("OpenAI-Organization", "org-42")
        .match_body(Matcher::Json(json!({
            "training_file": "file-abc123",
            "model": "gpt-3.5-turbo-0613"
        })))
        .with_status(200)
        .with_body(r#"{"object": "fine_tuning.job", "id": "ftjob-1", "model": "gpt-3.5-turbo-0613", "status": "validating_files", "fine_tuned_model": null}"#)
        .create_async()
        .await;

    let api = client(&server).with_organization(Some("org-42".to_string()));
    let job = api.create_job(&CreateJobRequest::new("file-abc123")).await.unwrap();

    assert_eq!(job.id, "ftjob-1");
    assert_eq!(job.status.as_deref(), Some("validating_files"));
    assert!(job.fine_tuned_model.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_job_rejects_invalid_request_locally() {
    let server = Server::new_async().await;
    let err = client(&server).create_job(&CreateJobRequest::new("")).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_get_job_normalizes_quoted_id() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/fine_tuning/jobs/ftjob-1")
        .with_status(200)
        .with_body(r#"{"id": "ftjob-1", "status": "succeeded", "fine_tuned_model": "ft:gpt-3.5-turbo-0613:org::abc"}"#)
        .create_async()
        .await;

    let job = client(&server).get_job("\"ftjob-1\"").await.unwrap();
    assert_eq!(job.fine_tuned_model.as_deref(), Some("ft:gpt-3.5-turbo-0613:org::abc"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_jobs_passes_limit() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/fine_tuning/jobs")
        .match_query(Matcher::UrlEncoded("limit".to_string(), "10".to_string()))
        .with_status(200)
        .with_body(r#"{"object": "list", "data": [{"id": "ftjob-1"}, {"id": "ftjob-2"}], "has_more": true}"#)
        .create_async()
        .await;

    let page = client(&server).list_jobs(10).await.unwrap();
    assert_eq!(page.data.len(), 2);
    assert!(page.has_more);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cancel_job_and_list_events() {
    let mut server = Server::new_async().await;
    let cancel = server
        .mock("POST", "/fine_tuning/jobs/ftjob-1/cancel")
        .with_status(200)
        .with_body(r#"{"id": "ftjob-1", "status": "cancelled"}"#)
        .create_async()
        .await;
    let events = server
        .mock("GET", "/fine_tuning/jobs/ftjob-1/events")
        .match_query(Matcher::UrlEncoded("limit".to_string(), "5".to_string()))
        .with_status(200)
        .with_body(r#"{"object": "list", "data": [{"id": "ev-1", "level": "info", "message": "Job cancelled"}], "has_more": false}"#)
        .create_async()
        .await;

    let api = client(&server);
    let job = api.cancel_job("ftjob-1").await.unwrap();
    assert_eq!(job.status.as_deref(), Some("cancelled"));

    let page = api.list_events("ftjob-1", 5).await.unwrap();
    assert_eq!(page.data[0].message.as_deref(), Some("Job cancelled"));

    cancel.assert_async().await;
    events.assert_async().await;
}

#[tokio::test]
async fn test_delete_model() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/models/ft:gpt-3.5-turbo-0613:org::abc")
        .with_status(200)
        .with_body(r#"{"id": "ft:gpt-3.5-turbo-0613:org::abc", "object": "model", "deleted": true}"#)
        .create_async()
        .await;

    let deletion = client(&server).delete_model("ft:gpt-3.5-turbo-0613:org::abc").await.unwrap();
    assert!(deletion.deleted);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_status_surfaces_raw_body() {
    let mut server = Server::new_async().await;
    let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
    let mock = server
        .mock("GET", "/fine_tuning/jobs/ftjob-404")
        .with_status(401)
        .with_body(body)
        .expect(1)
        .create_async()
        .await;

    let err = client(&server).get_job("ftjob-404").await.unwrap_err();
    assert_eq!(err, ApiError::Api { status: 401, body: body.to_string() });
    // One-shot: no retry after the failure.
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unparsable_success_body() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/fine_tuning/jobs")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let err = client(&server).list_jobs(10).await.unwrap_err();
    assert!(matches!(err, ApiError::Serialization(_)));
}
