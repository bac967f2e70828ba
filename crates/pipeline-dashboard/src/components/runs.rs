//! Pipeline runs view
//!
//! The latest runs with client-side search and status filtering, per-run
//! cancel for active runs, and a JSON export of whatever is currently listed.

use leptos::*;
use leptos_router::A;
use wasm_bindgen_futures::spawn_local;

use super::icons::{Icon, IconKind};
use super::primitives::{Badge, BadgeVariant, EmptyState, LoadingSpinner, SearchInput, TableCard};
use super::status_badge::{status_style, StatusBadge};
use super::toast::use_toaster;
use crate::api::ApiClient;
use crate::config::DashboardConfig;
use crate::download::{trigger_download, MIME_JSON};
use crate::polling::{use_liveness, use_polling};
use crate::state::{filter_runs, format_number, format_timestamp, logs_route, pretty_json, run_duration};
use crate::types::{PipelineRun, RunStatus};

const RUNS_LIMIT: u32 = 100;
pub const RUNS_EXPORT_FILE: &str = "pipeline-runs.json";

/// Value of the status `<select>`; anything unrecognised means no filter
pub fn parse_status_filter(value: &str) -> Option<RunStatus> {
    RunStatus::ALL.into_iter().find(|s| s.as_str() == value)
}

/// `valid / total` when both are known
pub fn records_label(run: &PipelineRun) -> String {
    match (run.valid_records, run.total_records) {
        (Some(valid), Some(total)) => format!("{} / {}", format_number(valid), format_number(total)),
        (None, Some(total)) => format_number(total),
        _ => "-".to_string(),
    }
}

/// Runs table with search, filter, cancel and export
#[component]
pub fn RunsView() -> impl IntoView {
    let config = expect_context::<DashboardConfig>();
    let api = store_value(expect_context::<ApiClient>());
    let alive = store_value(use_liveness());
    let toaster = use_toaster();

    let runs = create_rw_signal(Vec::<PipelineRun>::new());
    let loading = create_rw_signal(true);
    let query = create_rw_signal(String::new());
    let status_filter = create_rw_signal(None::<RunStatus>);
    let cancelling = create_rw_signal(None::<String>);

    let refresh = move || {
        let (Some(api), Some(alive)) = (api.try_get_value(), alive.try_get_value()) else {
            return;
        };
        spawn_local(async move {
            let result = api.list_pipeline_runs(RUNS_LIMIT, None).await;
            if !alive.is_alive() {
                return;
            }
            match result {
                Ok(list) => runs.set(list),
                Err(err) => {
                    tracing::warn!(error = %err, "runs refresh failed");
                    toaster.error(err.to_string());
                }
            }
            loading.set(false);
        });
    };

    use_polling(config.poll.runs, refresh);

    let cancel = move |pipeline_id: String| {
        let (Some(api), Some(alive)) = (api.try_get_value(), alive.try_get_value()) else {
            return;
        };
        cancelling.set(Some(pipeline_id.clone()));
        spawn_local(async move {
            let result = api.cancel_pipeline(&pipeline_id).await;
            if !alive.is_alive() {
                return;
            }
            cancelling.set(None);
            match result {
                Ok(ack) => {
                    tracing::info!(pipeline_id = %pipeline_id, "pipeline cancelled");
                    toaster.success(ack.message_or(&format!("Pipeline {} cancelled", pipeline_id)));
                    refresh();
                }
                Err(err) => toaster.error(err.to_string()),
            }
        });
    };

    let filtered = create_memo(move |_| {
        runs.with(|r| filter_runs(r, &query.get(), status_filter.get()))
    });

    let export = move |_| {
        let content = filtered.with(|r| pretty_json(r));
        match trigger_download(RUNS_EXPORT_FILE, &content, MIME_JSON) {
            Ok(()) => toaster.success(format!("Exported {} runs", filtered.with(Vec::len))),
            Err(err) => toaster.error(err.to_string()),
        }
    };

    view! {
        <div class="view active" role="main" aria-label="Pipeline runs">
            <div class="toolbar">
                <SearchInput value=query placeholder="Search by pipeline ID or metadata file..."/>
                <select
                    class="select"
                    aria-label="Filter by status"
                    on:change=move |ev| status_filter.set(parse_status_filter(&event_target_value(&ev)))
                >
                    <option value="all">"All statuses"</option>
                    {RunStatus::ALL
                        .into_iter()
                        .map(|s| view! { <option value=s.as_str()>{status_style(s).label}</option> })
                        .collect_view()}
                </select>
                <button class="btn btn-outline" on:click=export>
                    <Icon kind=IconKind::Download/>
                    "Export"
                </button>
            </div>

            <TableCard title="All Runs" description="Complete history of pipeline executions">
                <Show
                    when=move || !loading.get()
                    fallback=|| view! { <LoadingSpinner message="Loading runs..."/> }
                >
                    <Show
                        when=move || filtered.with(|r| !r.is_empty())
                        fallback=|| view! {
                            <EmptyState
                                title="No pipeline runs found"
                                description="Try adjusting your search or status filter"
                            />
                        }
                    >
                        <table role="table" aria-label="Pipeline runs">
                            <thead>
                                <tr>
                                    <th scope="col">"Pipeline ID"</th>
                                    <th scope="col">"Metadata File"</th>
                                    <th scope="col">"Method"</th>
                                    <th scope="col">"Status"</th>
                                    <th scope="col">"Start Time"</th>
                                    <th scope="col">"Duration"</th>
                                    <th scope="col">"Records"</th>
                                    <th scope="col" class="text-right">"Actions"</th>
                                </tr>
                            </thead>
                            <tbody>
                                <For
                                    each=move || filtered.get()
                                    key=|r| (r.pipeline_id.clone(), r.status, r.end_time.clone())
                                    children=move |run| {
                                        let id = run.pipeline_id.clone();
                                        let cancel_id = id.clone();
                                        let busy_id = id.clone();
                                        let is_busy = move || cancelling.with(|c| c.as_deref() == Some(busy_id.as_str()));
                                        view! {
                                            <tr>
                                                <td class="mono">{id.clone()}</td>
                                                <td class="truncate">
                                                    {run.metadata_name.clone()}
                                                    {run.error_message.clone().map(|e| view! { <p class="run-error">{e}</p> })}
                                                </td>
                                                <td>
                                                    {match run.execution_method {
                                                        Some(method) => view! {
                                                            <Badge text=method.label() variant=BadgeVariant::Outline/>
                                                        }.into_view(),
                                                        None => "-".into_view(),
                                                    }}
                                                </td>
                                                <td><StatusBadge status=run.status/></td>
                                                <td class="muted">{format_timestamp(&run.start_time)}</td>
                                                <td>{run_duration(&run)}</td>
                                                <td class="mono">{records_label(&run)}</td>
                                                <td class="text-right actions">
                                                    <A href=logs_route(&id) class="btn btn-ghost">
                                                        <Icon kind=IconKind::Eye/>
                                                    </A>
                                                    {run.status.is_active().then(|| view! {
                                                        <button
                                                            class="btn btn-ghost tone-destructive"
                                                            title="Cancel run"
                                                            aria-label="Cancel run"
                                                            disabled=is_busy
                                                            on:click=move |_| cancel(cancel_id.clone())
                                                        >
                                                            <Icon kind=IconKind::XCircle/>
                                                        </button>
                                                    })}
                                                </td>
                                            </tr>
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                    </Show>
                </Show>
            </TableCard>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_filter() {
        assert_eq!(parse_status_filter("all"), None);
        assert_eq!(parse_status_filter(""), None);
        assert_eq!(parse_status_filter("failed"), Some(RunStatus::Failed));
        assert_eq!(parse_status_filter("queued_airflow"), Some(RunStatus::QueuedAirflow));
    }

    #[test]
    fn test_records_label() {
        let mut run = PipelineRun::default();
        assert_eq!(records_label(&run), "-");

        run.total_records = Some(1_500);
        assert_eq!(records_label(&run), "1.5K");

        run.valid_records = Some(950);
        assert_eq!(records_label(&run), "950 / 1.5K");
    }
}
