//! Execute pipeline view
//!
//! Form for starting a run: metadata file, dispatch mode, async toggle and
//! optional JSON parameters. On success the user is taken to the new run's
//! logs after a short delay.

use std::time::Duration;

use leptos::*;
use leptos_router::use_navigate;
use wasm_bindgen_futures::spawn_local;

use super::icons::{Icon, IconKind};
use super::primitives::TableCard;
use super::toast::use_toaster;
use crate::api::ApiClient;
use crate::polling::use_liveness;
use crate::state::{logs_route, parse_parameters};
use crate::types::{ExecutionMethod, MetadataFile, RunPipelineRequest, RunPipelineResponse};

/// Delay between the success toast and the redirect to the run's logs
pub const NAVIGATE_DELAY: Duration = Duration::from_millis(1500);

/// Which endpoint starts the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// `POST /pipeline/run`; the backend picks the dispatch path
    #[default]
    Default,
    Direct,
    Airflow,
}

impl ExecutionMode {
    pub const ALL: [ExecutionMode; 3] = [ExecutionMode::Default, ExecutionMode::Direct, ExecutionMode::Airflow];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Default => "default",
            ExecutionMode::Direct => "direct",
            ExecutionMode::Airflow => "airflow",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExecutionMode::Default => "Default (backend decides)",
            ExecutionMode::Direct => "Direct",
            ExecutionMode::Airflow => "Airflow",
        }
    }

    pub fn parse(value: &str) -> Self {
        match ExecutionMethod::parse(value) {
            Some(ExecutionMethod::Direct) => ExecutionMode::Direct,
            Some(ExecutionMethod::Airflow) => ExecutionMode::Airflow,
            None => ExecutionMode::Default,
        }
    }

    pub fn method(&self) -> Option<ExecutionMethod> {
        match self {
            ExecutionMode::Default => None,
            ExecutionMode::Direct => Some(ExecutionMethod::Direct),
            ExecutionMode::Airflow => Some(ExecutionMethod::Airflow),
        }
    }
}

/// Validate the form into a request; the error is the user-facing message
pub fn build_run_request(
    metadata: &str,
    async_execution: bool,
    parameters: &str,
) -> Result<RunPipelineRequest, String> {
    let metadata = metadata.trim();
    if metadata.is_empty() {
        return Err("Please select a metadata file".to_string());
    }

    let request = RunPipelineRequest::new(metadata, async_execution);
    Ok(match parse_parameters(parameters)? {
        Some(params) => request.with_parameters(params),
        None => request,
    })
}

/// Success toast text
pub fn started_message(response: &RunPipelineResponse) -> String {
    format!("Pipeline {} started", response.pipeline_id)
}

/// Pipeline execution form
#[component]
pub fn ExecuteView() -> impl IntoView {
    let api = expect_context::<ApiClient>();
    let toaster = use_toaster();
    let navigate = use_navigate();
    let alive = store_value(use_liveness());

    let files = create_rw_signal(Vec::<MetadataFile>::new());
    let metadata = create_rw_signal(String::new());
    let mode = create_rw_signal(ExecutionMode::Default);
    let async_execution = create_rw_signal(true);
    let parameters = create_rw_signal(String::new());

    // Metadata choices, fetched once on mount
    if let Some(liveness) = alive.try_get_value() {
        let api = api.clone();
        spawn_local(async move {
            let result = api.list_metadata().await;
            if !liveness.is_alive() {
                return;
            }
            match result {
                Ok(list) => files.set(list),
                Err(err) => toaster.error(err.to_string()),
            }
        });
    }

    let run = create_action(move |(mode, request): &(ExecutionMode, RunPipelineRequest)| {
        let api = api.clone();
        let mode = *mode;
        let request = request.clone();
        async move {
            match mode.method() {
                Some(method) => api.run_pipeline_via(method, &request).await,
                None => api.run_pipeline(&request).await,
            }
        }
    });

    create_effect(move |_| {
        let Some(result) = run.value().get() else {
            return;
        };
        match result {
            Ok(response) => {
                tracing::info!(pipeline_id = %response.pipeline_id, "pipeline started");
                toaster.success(started_message(&response));

                let route = logs_route(&response.pipeline_id);
                let navigate = navigate.clone();
                set_timeout(
                    move || {
                        if alive.try_get_value().is_some_and(|l| l.is_alive()) {
                            navigate(&route, Default::default());
                        }
                    },
                    NAVIGATE_DELAY,
                );
            }
            Err(err) => {
                tracing::warn!(error = %err, "pipeline start failed");
                toaster.error(err.to_string());
            }
        }
    });

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        match build_run_request(
            &metadata.get_untracked(),
            async_execution.get_untracked(),
            &parameters.get_untracked(),
        ) {
            Ok(request) => run.dispatch((mode.get_untracked(), request)),
            Err(message) => toaster.error(message),
        }
    };

    view! {
        <div class="view active narrow" role="main" aria-label="Execute pipeline">
            <form on:submit=submit>
                <TableCard title="Metadata Configuration" description="Select the metadata file to use for this pipeline execution">
                    <div class="card-body form">
                        <label for="metadata">"Metadata File"</label>
                        <select
                            id="metadata"
                            class="select"
                            on:change=move |ev| metadata.set(event_target_value(&ev))
                        >
                            <option value="" selected=move || metadata.with(String::is_empty)>
                                "Select a metadata file"
                            </option>
                            {move || {
                                files
                                    .get()
                                    .into_iter()
                                    .map(|file| {
                                        let label = match (&file.version, file.is_active) {
                                            (_, false) => format!("{} (inactive)", file.name),
                                            (Some(v), true) => format!("{} (v{})", file.name, v),
                                            (None, true) => file.name.clone(),
                                        };
                                        let is_selected = metadata.with_untracked(|m| *m == file.name);
                                        view! {
                                            <option
                                                value=file.name.clone()
                                                disabled=!file.is_active
                                                selected=is_selected
                                            >
                                                {label}
                                            </option>
                                        }
                                    })
                                    .collect_view()
                            }}
                        </select>
                        <p class="hint">"Choose the configuration file that defines the pipeline dataflows"</p>

                        <label for="parameters">"Additional Parameters (Optional)"</label>
                        <textarea
                            id="parameters"
                            class="textarea mono"
                            placeholder=r#"{"batch_size": 1000, "parallel_jobs": 4}"#
                            prop:value=move || parameters.get()
                            on:input=move |ev| parameters.set(event_target_value(&ev))
                        ></textarea>
                        <p class="hint">"JSON object overriding the default configuration"</p>
                    </div>
                </TableCard>

                <TableCard title="Execution Options" description="Configure how the pipeline should be executed">
                    <div class="card-body form">
                        <label for="mode">"Execution Mode"</label>
                        <select
                            id="mode"
                            class="select"
                            on:change=move |ev| mode.set(ExecutionMode::parse(&event_target_value(&ev)))
                        >
                            {ExecutionMode::ALL
                                .into_iter()
                                .map(|m| view! { <option value=m.as_str()>{m.label()}</option> })
                                .collect_view()}
                        </select>

                        <label class="switch">
                            <input
                                type="checkbox"
                                prop:checked=move || async_execution.get()
                                on:change=move |ev| async_execution.set(event_target_checked(&ev))
                            />
                            <span>"Asynchronous Execution"</span>
                        </label>
                        <p class="hint">"Run pipeline in background and return immediately"</p>

                        <button
                            type="submit"
                            class="btn btn-primary btn-block"
                            disabled=move || run.pending().get()
                        >
                            <Icon kind=IconKind::Play/>
                            {move || if run.pending().get() { "Starting..." } else { "Execute Pipeline" }}
                        </button>
                    </div>
                </TableCard>
            </form>

            <div class="tip-card">
                <Icon kind=IconKind::Info/>
                <ul>
                    <li>"Ensure metadata file is validated before execution"</li>
                    <li>"Use async mode for long-running pipelines"</li>
                    <li>"Monitor logs in real-time for debugging"</li>
                    <li>"Check health status before starting critical jobs"</li>
                </ul>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_run_request() {
        let request = build_run_request("x.json", true, "").unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"metadata_path": "x.json", "async_execution": true})
        );

        let request = build_run_request("x.json", false, r#"{"batch_size": 1000}"#).unwrap();
        assert_eq!(request.parameters.unwrap()["batch_size"], 1000);
    }

    #[test]
    fn test_build_run_request_rejects_bad_input() {
        assert_eq!(
            build_run_request("", true, "").unwrap_err(),
            "Please select a metadata file"
        );
        assert_eq!(
            build_run_request("x.json", true, "[1, 2]").unwrap_err(),
            "Parameters must be a valid JSON object"
        );
        assert_eq!(
            build_run_request("x.json", true, "{not json").unwrap_err(),
            "Parameters must be a valid JSON object"
        );
    }

    #[test]
    fn test_execution_mode() {
        assert_eq!(ExecutionMode::parse("airflow"), ExecutionMode::Airflow);
        assert_eq!(ExecutionMode::parse("default"), ExecutionMode::Default);
        assert_eq!(ExecutionMode::Default.method(), None);
        assert_eq!(ExecutionMode::Direct.method(), Some(ExecutionMethod::Direct));
    }

    #[test]
    fn test_started_message_and_route() {
        let response: RunPipelineResponse = serde_json::from_str(r#"{"pipeline_id":"pip-123"}"#).unwrap();
        assert_eq!(started_message(&response), "Pipeline pip-123 started");
        assert_eq!(logs_route(&response.pipeline_id), "/logs?id=pip-123");
    }
}
