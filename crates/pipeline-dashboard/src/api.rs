//! REST API client for the pipeline execution service
//!
//! One method per backend endpoint. Each call issues exactly one HTTP request
//! (no retries, no timeout, no caching), checks the status and reshapes the
//! JSON body into a domain type from [`crate::types`].
//!
//! The network is reached through the [`Transport`] trait. In the browser
//! that is [`GlooTransport`] (gloo-net over `fetch`); tests plug in an
//! in-memory transport.

use async_trait::async_trait;
use gloo_net::http::Request;
use serde::de::DeserializeOwned;
use serde_json::Value;
use wasm_bindgen::JsValue;

use crate::config::{normalize_url, DashboardConfig};
use crate::types::{
    Acknowledgement, AirflowDag, ExecutionMethod, HealthStatus, MetadataFile, MetadataStats,
    PipelineLog, PipelineRun, PipelineStage, PipelineStats, RunPipelineRequest,
    RunPipelineResponse, ServiceInfo,
};

/// Result type alias for API calls
pub type ApiResult<T> = std::result::Result<T, ApiError>;

// ============================================================================
// Error Types
// ============================================================================

/// API error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Non-success status. `message` is the backend's `detail` when it sent
    /// one, otherwise the operation's fallback text.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    Request(String),
}

impl ApiError {
    /// HTTP status, if the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<gloo_net::Error> for ApiError {
    fn from(err: gloo_net::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

// ============================================================================
// Transport
// ============================================================================

/// HTTP method subset used by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    /// Serialized JSON document
    Json(String),
    /// Single-file multipart form
    Multipart {
        field: String,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub body: RequestBody,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and returns the raw response.
///
/// Implementations must not retry; a transport failure is reported as
/// [`ApiError::Network`]. Browser futures are not `Send`.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse>;
}

/// Browser `fetch` transport built on gloo-net
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooTransport;

#[async_trait(?Send)]
impl Transport for GlooTransport {
    async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        let builder = match request.method {
            Method::Get => Request::get(&request.url),
            Method::Post => Request::post(&request.url),
            Method::Delete => Request::delete(&request.url),
        };

        let prepared = match request.body {
            RequestBody::Empty => builder.build()?,
            RequestBody::Json(json) => builder
                .header("Content-Type", "application/json")
                .body(json)?,
            RequestBody::Multipart {
                field,
                file_name,
                content_type,
                bytes,
            } => builder.body(multipart_form(&field, &file_name, &content_type, &bytes)?)?,
        };

        let resp = prepared.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        Ok(HttpResponse { status, body })
    }
}

fn multipart_form(
    field: &str,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
) -> ApiResult<web_sys::FormData> {
    let form = web_sys::FormData::new().map_err(js_error)?;

    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(content_type);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
        .map_err(js_error)?;

    form.append_with_blob_and_filename(field, &blob, file_name)
        .map_err(js_error)?;
    Ok(form)
}

fn js_error(err: JsValue) -> ApiError {
    ApiError::Request(
        err.as_string()
            .unwrap_or_else(|| format!("{:?}", err)),
    )
}

// ============================================================================
// Client
// ============================================================================

/// API client for the pipeline service
#[derive(Debug, Clone)]
pub struct ApiClient<T = GlooTransport> {
    base_url: String,
    transport: T,
}

impl ApiClient<GlooTransport> {
    /// Create a new API client with the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_transport(base_url, GlooTransport)
    }

    /// Create an API client from dashboard configuration
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.api_url())
    }
}

impl<T: Transport> ApiClient<T> {
    /// Create a client that sends through the given transport
    pub fn with_transport(base_url: impl Into<String>, transport: T) -> Self {
        Self {
            base_url: normalize_url(&base_url.into()),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ------------------------------------------------------------------------
    // Health & Root
    // ------------------------------------------------------------------------

    /// Liveness check (`GET /`)
    pub async fn service_info(&self) -> ApiResult<ServiceInfo> {
        self.get("/", "Failed to fetch root").await
    }

    /// Health snapshot (`GET /health`)
    pub async fn health(&self) -> ApiResult<HealthStatus> {
        self.get("/health", "Failed to fetch health").await
    }

    // ------------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------------

    /// List metadata files (`GET /metadata`)
    pub async fn list_metadata(&self) -> ApiResult<Vec<MetadataFile>> {
        let body: Value = self.get("/metadata", "Failed to fetch metadata").await?;
        unwrap_list(body, "metadata_files")
    }

    /// Fetch one metadata document (`GET /metadata/{name}`)
    pub async fn get_metadata(&self, name: &str) -> ApiResult<Value> {
        let path = format!("/metadata/{}", segment(name));
        self.get(&path, &format!("Failed to fetch metadata: {}", name))
            .await
    }

    /// Upload a metadata file as multipart field `file` (`POST /metadata/upload`)
    pub async fn upload_metadata(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> ApiResult<Acknowledgement> {
        let body = RequestBody::Multipart {
            field: "file".to_string(),
            file_name: file_name.to_string(),
            content_type: "application/json".to_string(),
            bytes,
        };
        self.send_with(
            Method::Post,
            "/metadata/upload",
            body,
            "Failed to upload metadata",
            decode_acknowledgement,
        )
        .await
    }

    /// Remove or deactivate a metadata file (`DELETE /metadata/{name}?hard_delete=`)
    pub async fn delete_metadata(&self, name: &str, hard_delete: bool) -> ApiResult<Acknowledgement> {
        let path = format!("/metadata/{}?hard_delete={}", segment(name), hard_delete);
        self.send_with(
            Method::Delete,
            &path,
            RequestBody::Empty,
            "Failed to delete metadata",
            decode_acknowledgement,
        )
        .await
    }

    // ------------------------------------------------------------------------
    // Pipeline Execution
    // ------------------------------------------------------------------------

    /// Start a pipeline (`POST /pipeline/run`)
    pub async fn run_pipeline(&self, request: &RunPipelineRequest) -> ApiResult<RunPipelineResponse> {
        self.post_json("/pipeline/run", request, "Failed to run pipeline")
            .await
    }

    /// Start a pipeline with an explicit dispatch method
    /// (`POST /run/direct` or `POST /run/airflow`)
    pub async fn run_pipeline_via(
        &self,
        method: ExecutionMethod,
        request: &RunPipelineRequest,
    ) -> ApiResult<RunPipelineResponse> {
        let path = format!("/run/{}", method.as_str());
        self.post_json(&path, request, "Failed to run pipeline").await
    }

    /// Status of one run (`GET /pipeline/status/{id}`)
    pub async fn pipeline_status(&self, pipeline_id: &str) -> ApiResult<PipelineRun> {
        let path = format!("/pipeline/status/{}", segment(pipeline_id));
        self.get(
            &path,
            &format!("Failed to fetch pipeline status: {}", pipeline_id),
        )
        .await
    }

    /// Recent runs, newest first as ordered by the backend
    /// (`GET /pipeline/runs?limit=&execution_method=`)
    pub async fn list_pipeline_runs(
        &self,
        limit: u32,
        execution_method: Option<ExecutionMethod>,
    ) -> ApiResult<Vec<PipelineRun>> {
        let mut path = format!("/pipeline/runs?limit={}", limit);
        if let Some(method) = execution_method {
            path.push_str("&execution_method=");
            path.push_str(method.as_str());
        }
        let body: Value = self.get(&path, "Failed to fetch pipeline runs").await?;
        unwrap_list(body, "runs")
    }

    /// Cancel a running pipeline (`DELETE /pipeline/{id}`)
    pub async fn cancel_pipeline(&self, pipeline_id: &str) -> ApiResult<Acknowledgement> {
        let path = format!("/pipeline/{}", segment(pipeline_id));
        self.send_with(
            Method::Delete,
            &path,
            RequestBody::Empty,
            "Failed to cancel pipeline",
            decode_acknowledgement,
        )
        .await
    }

    /// Stage breakdown of one run (`GET /pipeline/{id}/stages`)
    pub async fn pipeline_stages(&self, pipeline_id: &str) -> ApiResult<Vec<PipelineStage>> {
        let path = format!("/pipeline/{}/stages", segment(pipeline_id));
        let body: Value = self
            .get(
                &path,
                &format!("Failed to fetch pipeline stages: {}", pipeline_id),
            )
            .await?;
        unwrap_list(body, "stages")
    }

    // ------------------------------------------------------------------------
    // Logs & Statistics
    // ------------------------------------------------------------------------

    /// Ordered log entries of one run (`GET /logs/{id}`)
    pub async fn pipeline_logs(&self, pipeline_id: &str) -> ApiResult<Vec<PipelineLog>> {
        let path = format!("/logs/{}", segment(pipeline_id));
        let body: Value = self
            .get(&path, &format!("Failed to fetch logs: {}", pipeline_id))
            .await?;
        unwrap_list(body, "logs")
    }

    /// Aggregate statistics (`GET /stats`)
    pub async fn stats(&self) -> ApiResult<PipelineStats> {
        self.get("/stats", "Failed to fetch statistics").await
    }

    /// Statistics for one metadata file (`GET /stats/metadata/{name}`)
    pub async fn metadata_stats(&self, name: &str) -> ApiResult<MetadataStats> {
        let path = format!("/stats/metadata/{}", segment(name));
        self.get(
            &path,
            &format!("Failed to fetch metadata statistics: {}", name),
        )
        .await
    }

    /// DAGs registered with the scheduler integration (`GET /airflow/dags`)
    pub async fn airflow_dags(&self) -> ApiResult<Vec<AirflowDag>> {
        let body: Value = self.get("/airflow/dags", "Failed to fetch Airflow DAGs").await?;
        unwrap_list(body, "dags")
    }

    // ------------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<R: DeserializeOwned>(&self, path: &str, fallback: &str) -> ApiResult<R> {
        self.send(Method::Get, path, RequestBody::Empty, fallback)
            .await
    }

    async fn post_json<B: serde::Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> ApiResult<R> {
        let json = serde_json::to_string(body).map_err(|e| ApiError::Request(e.to_string()))?;
        self.send(Method::Post, path, RequestBody::Json(json), fallback)
            .await
    }

    async fn send<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        fallback: &str,
    ) -> ApiResult<R> {
        self.send_with(method, path, body, fallback, decode_response)
            .await
    }

    async fn send_with<R>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        fallback: &str,
        decode: fn(HttpResponse, &str) -> ApiResult<R>,
    ) -> ApiResult<R> {
        let url = self.url(path);
        tracing::debug!(method = method.as_str(), %url, "api request");

        let request = HttpRequest {
            method,
            url: url.clone(),
            body,
        };

        let result = match self.transport.send(request).await {
            Ok(response) => decode(response, fallback),
            Err(err) => Err(err),
        };

        if let Err(err) = &result {
            tracing::warn!(method = method.as_str(), %url, error = %err, "api request failed");
        }
        result
    }
}

// ============================================================================
// Response Handling
// ============================================================================

/// Turn a raw response into a typed value or an [`ApiError`]
pub fn decode_response<R: DeserializeOwned>(response: HttpResponse, fallback: &str) -> ApiResult<R> {
    if !response.is_success() {
        return Err(ApiError::Status {
            status: response.status,
            message: error_message(&response.body, fallback),
        });
    }

    serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Like [`decode_response`], but a success with an empty body (e.g. `204 No
/// Content`) is an acknowledgement without a message
pub fn decode_acknowledgement(response: HttpResponse, fallback: &str) -> ApiResult<Acknowledgement> {
    if response.is_success() && response.body.trim().is_empty() {
        return Ok(Acknowledgement::default());
    }
    decode_response(response, fallback)
}

/// The backend's `detail` field, or `fallback` when there is none.
///
/// A non-empty string detail is used verbatim; structured details (validation
/// error lists) are rendered as JSON text. Scalars other than strings fall back.
pub fn error_message(body: &str, fallback: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| match v {
            Value::Object(mut map) => map.remove("detail"),
            _ => None,
        });

    match detail {
        Some(Value::String(s)) if !s.is_empty() => s,
        Some(Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)) | None => {
            fallback.to_string()
        }
        Some(other) => other.to_string(),
    }
}

/// Accept either a bare array or an object wrapping it under `field`
fn unwrap_list<R: DeserializeOwned>(body: Value, field: &str) -> ApiResult<Vec<R>> {
    let items = match body {
        Value::Array(_) => body,
        Value::Object(mut map) => match map.remove(field) {
            Some(Value::Null) => return Ok(Vec::new()),
            Some(items) => items,
            None => return Err(ApiError::Decode(format!("missing `{}` field", field))),
        },
        other => {
            return Err(ApiError::Decode(format!(
                "expected a list or an object with `{}`, got {}",
                field, other
            )))
        }
    };

    serde_json::from_value(items).map_err(|e| ApiError::Decode(e.to_string()))
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: Value) -> HttpResponse {
        HttpResponse {
            status,
            body: body.to_string(),
        }
    }

    fn response_text(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_error_message_uses_detail() {
        assert_eq!(
            error_message(r#"{"detail":"in use"}"#, "Failed to delete metadata"),
            "in use"
        );
    }

    #[test]
    fn test_error_message_fallbacks() {
        let fallback = "Failed to cancel pipeline";
        assert_eq!(error_message("", fallback), fallback);
        assert_eq!(error_message("<html>502</html>", fallback), fallback);
        assert_eq!(error_message(r#"{"error":"nope"}"#, fallback), fallback);
        assert_eq!(error_message(r#"{"detail":null}"#, fallback), fallback);
        assert_eq!(error_message(r#"["detail"]"#, fallback), fallback);
    }

    #[test]
    fn test_error_message_scalar_detail_falls_back() {
        let fallback = "Failed to run pipeline";
        assert_eq!(error_message(r#"{"detail":false}"#, fallback), fallback);
        assert_eq!(error_message(r#"{"detail":true}"#, fallback), fallback);
        assert_eq!(error_message(r#"{"detail":0}"#, fallback), fallback);
        assert_eq!(error_message(r#"{"detail":""}"#, fallback), fallback);
    }

    #[test]
    fn test_empty_success_body_is_acknowledged() {
        let ack = decode_acknowledgement(response_text(204, ""), "Failed to delete metadata").unwrap();
        assert_eq!(ack, Acknowledgement::default());
        assert_eq!(ack.message_or("Deleted a.json"), "Deleted a.json");

        let ack = decode_acknowledgement(response(200, json!({"message": "ok"})), "fallback").unwrap();
        assert_eq!(ack.message.as_deref(), Some("ok"));

        let err = decode_acknowledgement(response_text(409, ""), "Failed to delete metadata").unwrap_err();
        assert_eq!(err.to_string(), "Failed to delete metadata");

        // Non-acknowledgement calls still require a body
        assert!(decode_response::<PipelineStats>(response_text(204, ""), "fallback").is_err());
    }

    #[test]
    fn test_error_message_structured_detail() {
        let body = r#"{"detail":[{"loc":["body","metadata_path"],"msg":"field required"}]}"#;
        let message = error_message(body, "Failed to run pipeline");
        assert!(message.contains("field required"));
    }

    #[test]
    fn test_decode_status_error_display() {
        let err = decode_response::<Value>(response(409, json!({"detail": "in use"})), "fallback")
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.to_string(), "in use");
    }

    #[test]
    fn test_decode_malformed_success_body() {
        let err = decode_response::<PipelineStats>(
            HttpResponse {
                status: 200,
                body: "not json".to_string(),
            },
            "fallback",
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_unwrap_list_shapes() {
        let wrapped: Vec<u32> = unwrap_list(json!({"runs": [3, 1, 2]}), "runs").unwrap();
        assert_eq!(wrapped, vec![3, 1, 2]);

        let bare: Vec<u32> = unwrap_list(json!([5, 4]), "runs").unwrap();
        assert_eq!(bare, vec![5, 4]);

        let null: Vec<u32> = unwrap_list(json!({"runs": null}), "runs").unwrap();
        assert!(null.is_empty());

        assert!(unwrap_list::<u32>(json!({"items": []}), "runs").is_err());
        assert!(unwrap_list::<u32>(json!("runs"), "runs").is_err());
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("pip-123"), "pip-123");
        assert_eq!(segment("motor config.json"), "motor%20config.json");
        assert_eq!(segment("a/b"), "a%2Fb");
    }
}
