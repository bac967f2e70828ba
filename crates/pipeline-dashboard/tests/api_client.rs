//! API client tests against an in-memory transport
//!
//! Each test scripts the backend's responses and then checks both the typed
//! result and the exact request the client put on the wire.
//!
//! Run with: cargo test -p pipeline-dashboard --test api_client

use std::cell::RefCell;
use std::collections::VecDeque;

use async_trait::async_trait;
use pipeline_dashboard::api::{
    ApiClient, ApiError, ApiResult, HttpRequest, HttpResponse, Method, RequestBody, Transport,
};
use pipeline_dashboard::types::{ExecutionMethod, HealthState, RunPipelineRequest, RunStatus};
use serde_json::{json, Value};

const BASE_URL: &str = "http://pipeline.test:8000";

/// Replays canned responses in order and records every request
#[derive(Default)]
struct ScriptedTransport {
    responses: RefCell<VecDeque<ApiResult<HttpResponse>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    fn respond(self, status: u16, body: Value) -> Self {
        self.responses.borrow_mut().push_back(Ok(HttpResponse {
            status,
            body: body.to_string(),
        }));
        self
    }

    fn respond_raw(self, status: u16, body: &str) -> Self {
        self.responses.borrow_mut().push_back(Ok(HttpResponse {
            status,
            body: body.to_string(),
        }));
        self
    }

    fn fail(self, err: ApiError) -> Self {
        self.responses.borrow_mut().push_back(Err(err));
        self
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    fn last_request(&self) -> HttpRequest {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait(?Send)]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("no scripted response".to_string())))
    }
}

fn client(transport: ScriptedTransport) -> ApiClient<ScriptedTransport> {
    ApiClient::with_transport(format!("{}/", BASE_URL), transport)
}

fn json_body(request: &HttpRequest) -> Value {
    match &request.body {
        RequestBody::Json(text) => serde_json::from_str(text).expect("body is not JSON"),
        other => panic!("expected a JSON body, got {:?}", other),
    }
}

#[tokio::test]
async fn test_health_snapshot() {
    let api = client(ScriptedTransport::default().respond(
        200,
        json!({
            "status": "healthy",
            "active_pipelines": 3,
            "database": "healthy",
            "timestamp": "2024-01-15T10:00:00Z"
        }),
    ));

    let health = api.health().await.unwrap();
    assert_eq!(health.status, HealthState::Healthy);
    assert_eq!(health.active_pipelines, 3);
    assert_eq!(health.database.as_deref(), Some("healthy"));
    assert_eq!(health.airflow, None);

    let request = api.transport().last_request();
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.url, format!("{}/health", BASE_URL));
    assert_eq!(request.body, RequestBody::Empty);
}

#[tokio::test]
async fn test_run_pipeline_posts_request_body() {
    let api = client(
        ScriptedTransport::default().respond(200, json!({"pipeline_id": "pip-123", "status": "running"})),
    );

    let response = api
        .run_pipeline(&RunPipelineRequest::new("x.json", true))
        .await
        .unwrap();
    assert_eq!(response.pipeline_id, "pip-123");
    assert_eq!(response.status, Some(RunStatus::Running));

    let request = api.transport().last_request();
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.url, format!("{}/pipeline/run", BASE_URL));
    assert_eq!(
        json_body(&request),
        json!({"metadata_path": "x.json", "async_execution": true})
    );
}

#[tokio::test]
async fn test_run_pipeline_via_airflow() {
    let mut params = serde_json::Map::new();
    params.insert("batch_size".to_string(), json!(1000));
    let api = client(ScriptedTransport::default().respond(
        200,
        json!({"pipeline_id": "pip-9", "status": "queued_airflow", "execution_method": "airflow"}),
    ));

    let response = api
        .run_pipeline_via(
            ExecutionMethod::Airflow,
            &RunPipelineRequest::new("motor.json", false).with_parameters(params),
        )
        .await
        .unwrap();
    assert_eq!(response.status, Some(RunStatus::QueuedAirflow));
    assert_eq!(response.execution_method, Some(ExecutionMethod::Airflow));

    let request = api.transport().last_request();
    assert_eq!(request.url, format!("{}/run/airflow", BASE_URL));
    assert_eq!(json_body(&request)["parameters"]["batch_size"], 1000);
}

#[tokio::test]
async fn test_list_runs_with_limit() {
    let api = client(ScriptedTransport::default().respond(200, json!({"runs": []})));

    let runs = api.list_pipeline_runs(5, None).await.unwrap();
    assert!(runs.is_empty());
    assert_eq!(
        api.transport().last_request().url,
        format!("{}/pipeline/runs?limit=5", BASE_URL)
    );
}

#[tokio::test]
async fn test_list_runs_preserves_backend_order() {
    let api = client(ScriptedTransport::default().respond(
        200,
        json!({"runs": [
            {"pipeline_id": "c", "metadata_name": "m.json", "status": "running", "start_time": "2024-01-15T10:02:00Z"},
            {"pipeline_id": "a", "metadata_name": "m.json", "status": "success", "start_time": "2024-01-15T10:01:00Z"},
            {"pipeline_id": "b", "metadata_name": "m.json", "status": "exploded", "start_time": "2024-01-15T10:00:00Z"}
        ]}),
    ));

    let runs = api
        .list_pipeline_runs(100, Some(ExecutionMethod::Direct))
        .await
        .unwrap();
    let ids: Vec<&str> = runs.iter().map(|r| r.pipeline_id.as_str()).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
    assert_eq!(runs[2].status, RunStatus::Unknown);
    assert_eq!(
        api.transport().last_request().url,
        format!("{}/pipeline/runs?limit=100&execution_method=direct", BASE_URL)
    );
}

#[tokio::test]
async fn test_delete_metadata_conflict_uses_detail() {
    let api = client(ScriptedTransport::default().respond(409, json!({"detail": "in use"})));

    let err = api.delete_metadata("a.json", false).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.to_string(), "in use");

    let request = api.transport().last_request();
    assert_eq!(request.method, Method::Delete);
    assert_eq!(
        request.url,
        format!("{}/metadata/a.json?hard_delete=false", BASE_URL)
    );
}

#[tokio::test]
async fn test_error_without_detail_uses_fallback() {
    let api = client(ScriptedTransport::default().respond_raw(502, "<html>Bad Gateway</html>"));

    let err = api.cancel_pipeline("pip-1").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 502,
            message: "Failed to cancel pipeline".to_string()
        }
    );
    assert_eq!(
        api.transport().last_request().url,
        format!("{}/pipeline/pip-1", BASE_URL)
    );
}

#[tokio::test]
async fn test_upload_metadata_sends_file_field() {
    let api = client(
        ScriptedTransport::default().respond(200, json!({"message": "Uploaded motor.json"})),
    );

    let ack = api
        .upload_metadata("motor.json", br#"{"dataflows": []}"#.to_vec())
        .await
        .unwrap();
    assert_eq!(ack.message_or("done"), "Uploaded motor.json");

    let request = api.transport().last_request();
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.url, format!("{}/metadata/upload", BASE_URL));
    match request.body {
        RequestBody::Multipart {
            field,
            file_name,
            bytes,
            ..
        } => {
            assert_eq!(field, "file");
            assert_eq!(file_name, "motor.json");
            assert_eq!(bytes, br#"{"dataflows": []}"#.to_vec());
        }
        other => panic!("expected multipart body, got {:?}", other),
    }
}

#[tokio::test]
async fn test_logs_and_stages_encode_id() {
    let api = client(
        ScriptedTransport::default()
            .respond(
                200,
                json!({"logs": [
                    {"timestamp": "2024-01-15T10:00:00Z", "level": "INFO", "stage": "validate", "message": "ok"}
                ]}),
            )
            .respond(200, json!([{"name": "validate", "status": "success"}])),
    );

    let logs = api.pipeline_logs("run 1").await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].stage.as_deref(), Some("validate"));

    let stages = api.pipeline_stages("run 1").await.unwrap();
    assert_eq!(stages[0].name, "validate");

    let urls: Vec<String> = api.transport().requests().into_iter().map(|r| r.url).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/logs/run%201", BASE_URL),
            format!("{}/pipeline/run%201/stages", BASE_URL),
        ]
    );
}

#[tokio::test]
async fn test_network_error_is_propagated() {
    let api = client(
        ScriptedTransport::default().fail(ApiError::Network("connection refused".to_string())),
    );

    let err = api.stats().await.unwrap_err();
    assert_eq!(err, ApiError::Network("connection refused".to_string()));
    assert_eq!(err.status(), None);
    assert_eq!(api.transport().requests().len(), 1);
}

#[tokio::test]
async fn test_service_info() {
    let api = client(ScriptedTransport::default().respond(
        200,
        json!({"message": "Motor Insurance Data Pipeline API", "version": "1.0.0"}),
    ));

    let info = api.service_info().await.unwrap();
    assert_eq!(info.message.as_deref(), Some("Motor Insurance Data Pipeline API"));
    assert_eq!(info.version.as_deref(), Some("1.0.0"));
    assert_eq!(api.transport().last_request().url, format!("{}/", BASE_URL));
}

#[tokio::test]
async fn test_list_metadata_preserves_order() {
    let api = client(ScriptedTransport::default().respond(
        200,
        json!({"metadata_files": [
            {"name": "b.json", "version": "2", "is_active": true, "created_at": "2024-01-02T00:00:00Z", "updated_at": "2024-01-03T00:00:00Z"},
            {"name": "a.json", "is_active": false, "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"}
        ]}),
    ));

    let files = api.list_metadata().await.unwrap();
    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["b.json", "a.json"]);
    assert_eq!(files[0].version.as_deref(), Some("2"));
    assert!(!files[1].is_active);
    assert_eq!(api.transport().last_request().url, format!("{}/metadata", BASE_URL));
}

#[tokio::test]
async fn test_get_metadata_returns_document() {
    let document = json!({"dataflows": [{"name": "policies", "sources": []}]});
    let api = client(ScriptedTransport::default().respond(200, document.clone()));

    let fetched = api.get_metadata("motor config.json").await.unwrap();
    assert_eq!(fetched, document);
    assert_eq!(
        api.transport().last_request().url,
        format!("{}/metadata/motor%20config.json", BASE_URL)
    );
}

#[tokio::test]
async fn test_metadata_stats() {
    let api = client(ScriptedTransport::default().respond(
        200,
        json!({
            "metadata_name": "motor.json",
            "total_runs": 4,
            "successful_runs": 3,
            "failed_runs": 1,
            "success_rate": 75.0,
            "last_run": "2024-01-15T10:00:00Z"
        }),
    ));

    let stats = api.metadata_stats("motor.json").await.unwrap();
    assert_eq!(stats.total_runs, 4);
    assert_eq!(stats.success_rate, 75.0);
    assert_eq!(stats.last_run.as_deref(), Some("2024-01-15T10:00:00Z"));
    assert_eq!(
        api.transport().last_request().url,
        format!("{}/stats/metadata/motor.json", BASE_URL)
    );
}

#[tokio::test]
async fn test_airflow_dags_preserve_order() {
    let api = client(ScriptedTransport::default().respond(
        200,
        json!({"dags": [
            {"dag_id": "motor_pipeline", "is_paused": false, "is_active": true, "tags": ["motor"]},
            {"dag_id": "claims_pipeline", "is_paused": true}
        ]}),
    ));

    let dags = api.airflow_dags().await.unwrap();
    let ids: Vec<&str> = dags.iter().map(|d| d.dag_id.as_str()).collect();
    assert_eq!(ids, vec!["motor_pipeline", "claims_pipeline"]);
    assert_eq!(dags[0].tags, vec!["motor".to_string()]);
    assert!(dags[1].is_paused);
    assert!(dags[1].tags.is_empty());
    assert_eq!(api.transport().last_request().url, format!("{}/airflow/dags", BASE_URL));
}

#[tokio::test]
async fn test_pipeline_status_maps_legacy_keys() {
    let api = client(ScriptedTransport::default().respond(
        200,
        json!({
            "pipeline_id": "pip-7",
            "metadata_path": "motor.json",
            "status": "failed",
            "start_time": "2024-01-15T10:00:00Z",
            "error": "Validation error in dataflow step 3"
        }),
    ));

    let run = api.pipeline_status("pip-7").await.unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.metadata_name, "motor.json");
    assert_eq!(
        run.error_message.as_deref(),
        Some("Validation error in dataflow step 3")
    );
    assert_eq!(
        api.transport().last_request().url,
        format!("{}/pipeline/status/pip-7", BASE_URL)
    );
}

#[tokio::test]
async fn test_upload_rejection_uses_detail() {
    let api = client(
        ScriptedTransport::default().respond(400, json!({"detail": "Invalid JSON in metadata file"})),
    );

    let err = api
        .upload_metadata("broken.json", b"{".to_vec())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "Invalid JSON in metadata file");
}

#[tokio::test]
async fn test_upload_rejection_without_detail_uses_fallback() {
    let api = client(ScriptedTransport::default().respond(413, json!({})));

    let err = api
        .upload_metadata("huge.json", b"{}".to_vec())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to upload metadata");
}

#[tokio::test]
async fn test_run_rejection_uses_detail_or_fallback() {
    let api = client(
        ScriptedTransport::default()
            .respond(404, json!({"detail": "Metadata file not found: x.json"}))
            .respond(500, json!({"detail": null})),
    );
    let request = RunPipelineRequest::new("x.json", true);

    let err = api.run_pipeline(&request).await.unwrap_err();
    assert_eq!(err.to_string(), "Metadata file not found: x.json");

    let err = api
        .run_pipeline_via(ExecutionMethod::Direct, &request)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "Failed to run pipeline");
    assert_eq!(
        api.transport().last_request().url,
        format!("{}/run/direct", BASE_URL)
    );
}

#[tokio::test]
async fn test_cancel_with_empty_body_succeeds() {
    let api = client(ScriptedTransport::default().respond_raw(204, ""));

    let ack = api.cancel_pipeline("pip-1").await.unwrap();
    assert_eq!(ack.message_or("Pipeline pip-1 cancelled"), "Pipeline pip-1 cancelled");
    assert_eq!(api.transport().last_request().method, Method::Delete);
}
