//! Pipeline logs view
//!
//! Log entries of one run, picked from the recent runs or preselected through
//! `?id=`. Entries are searchable and the filtered set can be downloaded as
//! plain text. A stage timeline is shown when the backend provides one.

use leptos::*;
use leptos_router::use_query_map;
use wasm_bindgen_futures::spawn_local;

use super::icons::{Icon, IconKind};
use super::primitives::{
    Badge, BadgeVariant, EmptyState, InfoRow, LoadingSpinner, SearchInput, TableCard,
};
use super::status_badge::StatusBadge;
use super::toast::use_toaster;
use crate::api::ApiClient;
use crate::config::DashboardConfig;
use crate::download::{trigger_download, MIME_TEXT};
use crate::polling::{use_liveness, use_polling_with, FirstTick};
use crate::state::{
    export_logs, filter_logs, format_number, format_timestamp, log_file_name, pretty_json,
    run_duration,
};
use crate::types::{PipelineLog, PipelineRun, PipelineStage, RunStatus};

const PICKER_LIMIT: u32 = 50;

/// Badge color for a log level
pub fn log_level_variant(level: &str) -> BadgeVariant {
    match level.to_uppercase().as_str() {
        "ERROR" | "CRITICAL" => BadgeVariant::Error,
        "WARNING" => BadgeVariant::Warning,
        "INFO" => BadgeVariant::Default,
        _ => BadgeVariant::Secondary,
    }
}

/// Picker entries: recent run ids, with the selected id first when it is not
/// among them
pub fn picker_ids(recent: &[String], selected: Option<&str>) -> Vec<String> {
    match selected {
        Some(id) if !recent.iter().any(|r| r == id) => {
            std::iter::once(id.to_string()).chain(recent.iter().cloned()).collect()
        }
        _ => recent.to_vec(),
    }
}

/// Log viewer
#[component]
pub fn LogsView() -> impl IntoView {
    let config = expect_context::<DashboardConfig>();
    let api = store_value(expect_context::<ApiClient>());
    let alive = store_value(use_liveness());
    let toaster = use_toaster();
    let query_map = use_query_map();

    let recent_ids = create_rw_signal(Vec::<String>::new());
    let selected = create_rw_signal(None::<String>);
    let logs = create_rw_signal(Vec::<PipelineLog>::new());
    let stages = create_rw_signal(Vec::<PipelineStage>::new());
    let run = create_rw_signal(None::<PipelineRun>);
    let loading = create_rw_signal(false);
    let query = create_rw_signal(String::new());

    // `?id=` wins over the picker default whenever it changes
    create_effect(move |_| {
        if let Some(id) = query_map.with(|q| q.get("id").cloned()).filter(|id| !id.is_empty()) {
            selected.set(Some(id));
        }
    });

    // Picker contents, fetched once
    if let (Some(api), Some(alive)) = (api.try_get_value(), alive.try_get_value()) {
        spawn_local(async move {
            let result = api.list_pipeline_runs(PICKER_LIMIT, None).await;
            if !alive.is_alive() {
                return;
            }
            match result {
                Ok(runs) => {
                    if selected.get_untracked().is_none() {
                        selected.set(runs.first().map(|r| r.pipeline_id.clone()));
                    }
                    recent_ids.set(runs.into_iter().map(|r| r.pipeline_id).collect());
                }
                Err(err) => toaster.error(err.to_string()),
            }
        });
    }

    let fetch_logs = move || {
        let Some(id) = selected.get_untracked() else {
            return;
        };
        let (Some(api), Some(alive)) = (api.try_get_value(), alive.try_get_value()) else {
            return;
        };
        spawn_local(async move {
            let (logs_result, stages_result, run_result) = futures::join!(
                api.pipeline_logs(&id),
                api.pipeline_stages(&id),
                api.pipeline_status(&id)
            );
            // Drop responses for a run that is no longer selected
            if !alive.is_alive() || selected.get_untracked().as_deref() != Some(id.as_str()) {
                return;
            }

            match logs_result {
                Ok(entries) => logs.set(entries),
                Err(err) => {
                    tracing::warn!(pipeline_id = %id, error = %err, "log fetch failed");
                    toaster.error(err.to_string());
                    logs.set(Vec::new());
                }
            }
            match stages_result {
                Ok(list) => stages.set(list),
                Err(err) => {
                    tracing::debug!(pipeline_id = %id, error = %err, "no stage breakdown");
                    stages.set(Vec::new());
                }
            }
            match run_result {
                Ok(snapshot) => run.set(Some(snapshot)),
                Err(err) => tracing::debug!(pipeline_id = %id, error = %err, "no run status"),
            }
            loading.set(false);
        });
    };

    create_effect(move |_| {
        if selected.get().is_some() {
            loading.set(true);
            logs.set(Vec::new());
            stages.set(Vec::new());
            run.set(None);
            fetch_logs();
        }
    });

    // The effect above does the immediate fetch on every selection change
    use_polling_with(config.poll.logs, FirstTick::AfterInterval, fetch_logs);

    let filtered = create_memo(move |_| logs.with(|l| filter_logs(l, &query.get())));

    let download = move |_| {
        let Some(id) = selected.get_untracked() else {
            toaster.error("Select a pipeline first");
            return;
        };
        let content = filtered.with(|l| export_logs(l));
        match trigger_download(&log_file_name(&id), &content, MIME_TEXT) {
            Ok(()) => toaster.success("Logs downloaded successfully"),
            Err(err) => toaster.error(err.to_string()),
        }
    };

    view! {
        <div class="view active" role="main" aria-label="Pipeline logs">
            <div class="toolbar">
                <select
                    class="select mono"
                    aria-label="Pipeline ID"
                    on:change=move |ev| {
                        let value = event_target_value(&ev);
                        selected.set((!value.is_empty()).then_some(value));
                    }
                >
                    <option value="" disabled=true selected=move || selected.with(Option::is_none)>
                        "Select a pipeline"
                    </option>
                    {move || {
                        let current = selected.get();
                        recent_ids
                            .with(|ids| picker_ids(ids, current.as_deref()))
                            .into_iter()
                            .map(|id| {
                                let is_selected = current.as_deref() == Some(id.as_str());
                                view! { <option value=id.clone() selected=is_selected>{id}</option> }
                            })
                            .collect_view()
                    }}
                </select>
                <SearchInput value=query placeholder="Filter log entries..."/>
                <button class="btn btn-outline" on:click=move |_| fetch_logs()>
                    <Icon kind=IconKind::Refresh/>
                    "Refresh"
                </button>
                <button class="btn btn-outline" on:click=download>
                    <Icon kind=IconKind::Download/>
                    "Download"
                </button>
            </div>

            <RunSummary run=run/>

            <StageTimeline stages=stages/>

            <TableCard title="Log Viewer" description="Real-time and historical pipeline execution logs">
                <Show
                    when=move || !loading.get()
                    fallback=|| view! { <LoadingSpinner message="Loading logs..."/> }
                >
                    <Show
                        when=move || filtered.with(|l| !l.is_empty())
                        fallback=|| view! { <EmptyState title="No logs available"/> }
                    >
                        <div class="log-list">
                            {move || {
                                filtered.with(|entries| {
                                    entries.iter().cloned().map(|log| view! { <LogEntry log=log/> }).collect_view()
                                })
                            }}
                        </div>
                    </Show>
                </Show>
            </TableCard>
        </div>
    }
}

#[component]
fn LogEntry(log: PipelineLog) -> impl IntoView {
    let variant = log_level_variant(&log.level);
    let details = log.details.as_ref().map(pretty_json);

    view! {
        <div class="log-entry">
            <Badge text=log.level.clone() variant=variant/>
            <div class="log-body">
                <div class="log-meta">
                    <span class="muted">{format_timestamp(&log.timestamp)}</span>
                    {log.stage.clone().map(|stage| view! { <Badge text=stage variant=BadgeVariant::Outline/> })}
                </div>
                <p class="log-message">{log.message.clone()}</p>
                {details.map(|d| view! { <pre class="code-block">{d}</pre> })}
            </div>
        </div>
    }
}

/// Status snapshot of the selected run
#[component]
fn RunSummary(run: RwSignal<Option<PipelineRun>>) -> impl IntoView {
    move || {
        run.get().map(|r| {
            let records = r.total_records.map_or("-".to_string(), format_number);
            let status = r.status;
            let metadata_name = r.metadata_name.clone();
            let started = format_timestamp(&r.start_time);
            let duration = run_duration(&r);
            let error_message = r.error_message.clone();
            view! {
                <TableCard title="Run" description="Latest status of the selected pipeline">
                    <div class="card-body">
                        <InfoRow label="Status"><StatusBadge status=status/></InfoRow>
                        <InfoRow label="Metadata File">{metadata_name}</InfoRow>
                        <InfoRow label="Started">{started}</InfoRow>
                        <InfoRow label="Duration">{duration}</InfoRow>
                        <InfoRow label="Records">{records}</InfoRow>
                        {error_message.map(|e| view! { <p class="run-error">{e}</p> })}
                    </div>
                </TableCard>
            }
        })
    }
}

#[component]
fn StageTimeline(stages: RwSignal<Vec<PipelineStage>>) -> impl IntoView {
    view! {
        <Show when=move || stages.with(|s| !s.is_empty())>
            <TableCard title="Stages" description="Execution stages of the selected run">
                <ol class="stage-list">
                    {move || {
                        stages.with(|list| {
                            list.iter()
                                .map(|stage| {
                                    let data = (!stage.data.is_empty()).then(|| pretty_json(&stage.data));
                                    view! {
                                        <li class="stage-item">
                                            <div class="stage-header">
                                                <span class="stage-name">{stage.name.clone()}</span>
                                                <StatusBadge status=RunStatus::parse(&stage.status)/>
                                            </div>
                                            <div class="stage-times muted">
                                                {stage.start_time.as_deref().map(format_timestamp)}
                                                {stage.end_time.as_deref().map(|end| format!(" → {}", format_timestamp(end)))}
                                            </div>
                                            {data.map(|d| view! {
                                                <details>
                                                    <summary>"Details"</summary>
                                                    <pre class="code-block">{d}</pre>
                                                </details>
                                            })}
                                        </li>
                                    }
                                })
                                .collect_view()
                        })
                    }}
                </ol>
            </TableCard>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_variant() {
        assert_eq!(log_level_variant("ERROR"), BadgeVariant::Error);
        assert_eq!(log_level_variant("critical"), BadgeVariant::Error);
        assert_eq!(log_level_variant("Warning"), BadgeVariant::Warning);
        assert_eq!(log_level_variant("INFO"), BadgeVariant::Default);
        assert_eq!(log_level_variant("DEBUG"), BadgeVariant::Secondary);
        assert_eq!(log_level_variant(""), BadgeVariant::Secondary);
    }

    #[test]
    fn test_picker_ids() {
        let recent = vec!["pip-2".to_string(), "pip-1".to_string()];
        assert_eq!(picker_ids(&recent, None), recent);
        assert_eq!(picker_ids(&recent, Some("pip-1")), recent);
        assert_eq!(
            picker_ids(&recent, Some("pip-0")),
            vec!["pip-0".to_string(), "pip-2".to_string(), "pip-1".to_string()]
        );
    }
}
