//! Domain types shared between the API client and the views
//!
//! These are the shapes the backend speaks. Deserialization is lenient where
//! the backend has been observed to omit or rename fields: optional fields
//! default, legacy keys are accepted as aliases, and unknown status strings
//! map to a catch-all variant instead of failing a whole list.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Pipeline Runs
// ============================================================================

/// Lifecycle status of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Success,
    Failed,
    Pending,
    Cancelled,
    Queued,
    QueuedAirflow,
    #[default]
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Every status, in display order
    pub const ALL: [RunStatus; 8] = [
        RunStatus::Running,
        RunStatus::Queued,
        RunStatus::QueuedAirflow,
        RunStatus::Pending,
        RunStatus::Success,
        RunStatus::Failed,
        RunStatus::Cancelled,
        RunStatus::Unknown,
    ];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
            RunStatus::Pending => "pending",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Queued => "queued",
            RunStatus::QueuedAirflow => "queued_airflow",
            RunStatus::Unknown => "unknown",
        }
    }

    /// Parse the wire representation, mapping anything unrecognised to `Unknown`
    pub fn parse(value: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .unwrap_or(RunStatus::Unknown)
    }

    /// Whether the run has not reached a terminal state (and can be cancelled)
    pub fn is_active(&self) -> bool {
        match self {
            RunStatus::Running | RunStatus::Pending | RunStatus::Queued | RunStatus::QueuedAirflow => {
                true
            }
            RunStatus::Success | RunStatus::Failed | RunStatus::Cancelled | RunStatus::Unknown => {
                false
            }
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a pipeline was dispatched by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMethod {
    Direct,
    Airflow,
}

impl ExecutionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMethod::Direct => "direct",
            ExecutionMethod::Airflow => "airflow",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExecutionMethod::Direct => "Direct",
            ExecutionMethod::Airflow => "Airflow",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "direct" => Some(ExecutionMethod::Direct),
            "airflow" => Some(ExecutionMethod::Airflow),
            _ => None,
        }
    }
}

impl fmt::Display for ExecutionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One execution attempt of a named pipeline
///
/// `pipeline_id` is opaque: it is used for cross-referencing runs, logs and
/// routes, never parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PipelineRun {
    pub pipeline_id: String,
    #[serde(default, alias = "metadata_path")]
    pub metadata_name: String,
    #[serde(default)]
    pub execution_method: Option<ExecutionMethod>,
    #[serde(default)]
    pub status: RunStatus,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub total_records: Option<u64>,
    #[serde(default)]
    pub valid_records: Option<u64>,
    #[serde(default)]
    pub invalid_records: Option<u64>,
    #[serde(default)]
    pub valid_percentage: Option<f64>,
    #[serde(default, alias = "error")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub stages: Option<HashMap<String, Value>>,
    #[serde(default)]
    pub log_count: Option<u64>,
}

// ============================================================================
// Statistics
// ============================================================================

/// Aggregate counters across all runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PipelineStats {
    #[serde(default)]
    pub total_runs: u64,
    #[serde(default)]
    pub successful_runs: u64,
    #[serde(default)]
    pub failed_runs: u64,
    #[serde(default)]
    pub running_pipelines: u64,
    /// Percentage in `0.0..=100.0`
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub avg_duration: Option<f64>,
    #[serde(default)]
    pub execution_methods: Option<ExecutionMethodStats>,
    #[serde(default)]
    pub active_metadata_files: Option<u64>,
}

/// Per-dispatch-method breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExecutionMethodStats {
    #[serde(default)]
    pub direct: MethodCounters,
    #[serde(default)]
    pub airflow: MethodCounters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MethodCounters {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub successful: u64,
    #[serde(default)]
    pub failed: u64,
}

/// Run statistics for a single metadata file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MetadataStats {
    #[serde(default, alias = "metadata_path")]
    pub metadata_name: String,
    #[serde(default)]
    pub total_runs: u64,
    #[serde(default)]
    pub successful_runs: u64,
    #[serde(default)]
    pub failed_runs: u64,
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub last_run: Option<String>,
}

// ============================================================================
// Metadata
// ============================================================================

/// A named pipeline configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataFile {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Health
// ============================================================================

/// Backend liveness/readiness level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
    #[default]
    #[serde(other)]
    Unhealthy,
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Healthy => "healthy",
            HealthState::Degraded => "degraded",
            HealthState::Unhealthy => "unhealthy",
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend health snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: HealthState,
    #[serde(default)]
    pub active_pipelines: u64,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub airflow: Option<String>,
    #[serde(default)]
    pub timestamp: String,
}

/// Response of the root liveness endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ServiceInfo {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

// ============================================================================
// Logs & Stages
// ============================================================================

/// One log line emitted during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineLog {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Option<Value>,
}

/// A stage of a run as reported by `/pipeline/{id}/stages`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStage {
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub data: HashMap<String, Value>,
    #[serde(default)]
    pub logs: Vec<StageLogEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageLogEntry {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub message: String,
}

/// An Airflow DAG known to the backend's scheduler integration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirflowDag {
    pub dag_id: String,
    #[serde(default)]
    pub is_paused: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

// ============================================================================
// Mutations
// ============================================================================

/// Body of a pipeline execution request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunPipelineRequest {
    pub metadata_path: String,
    pub async_execution: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Map<String, Value>>,
}

impl RunPipelineRequest {
    pub fn new(metadata_path: impl Into<String>, async_execution: bool) -> Self {
        Self {
            metadata_path: metadata_path.into(),
            async_execution,
            parameters: None,
        }
    }

    pub fn with_parameters(mut self, parameters: serde_json::Map<String, Value>) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

/// Response of a pipeline execution request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunPipelineResponse {
    pub pipeline_id: String,
    #[serde(default)]
    pub status: Option<RunStatus>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub execution_method: Option<ExecutionMethod>,
}

/// Generic acknowledgement returned by mutating endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Acknowledgement {
    /// Backend message, or the given fallback
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}
