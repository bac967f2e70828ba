//! Dashboard landing page
//!
//! Shows:
//! - Headline counters (total, success rate, active, failed)
//! - Success vs failure bars
//! - Per-dispatch-method breakdown when the backend reports it
//! - The five most recent runs
//!
//! Stats and recent runs are fetched in parallel; each failure is toasted on
//! its own and the other half still renders.

use leptos::*;
use leptos_router::A;
use wasm_bindgen_futures::spawn_local;

use super::icons::{Icon, IconKind};
use super::primitives::{
    EmptyState, InfoRow, LoadingSpinner, ProgressBar, StatCard, StatVariant, TableCard, Trend,
};
use super::status_badge::StatusBadge;
use super::toast::use_toaster;
use crate::api::ApiClient;
use crate::config::DashboardConfig;
use crate::polling::{use_liveness, use_polling};
use crate::state::{format_number, format_percentage, format_seconds, logs_route};
use crate::types::{PipelineRun, PipelineStats};

const RECENT_RUNS: u32 = 5;

/// Success-rate change since the previous poll; `None` once it stops moving
pub fn success_trend(previous: Option<&PipelineStats>, current: &PipelineStats) -> Option<Trend> {
    previous.and_then(|p| Trend::between(p.success_rate, current.success_rate))
}

/// Main overview dashboard view
#[component]
pub fn DashboardView() -> impl IntoView {
    let api = expect_context::<ApiClient>();
    let config = expect_context::<DashboardConfig>();
    let toaster = use_toaster();
    let alive = use_liveness();

    let stats = create_rw_signal(None::<PipelineStats>);
    let runs = create_rw_signal(Vec::<PipelineRun>::new());
    let trend = create_rw_signal(None::<Trend>);
    let loading = create_rw_signal(true);
    let refreshing = create_rw_signal(false);

    let refresh = move || {
        if refreshing.get_untracked() {
            return;
        }
        refreshing.set(true);

        let api = api.clone();
        let alive = alive.clone();
        spawn_local(async move {
            let (stats_result, runs_result) =
                futures::join!(api.stats(), api.list_pipeline_runs(RECENT_RUNS, None));
            if !alive.is_alive() {
                return;
            }

            match stats_result {
                Ok(current) => {
                    trend.set(success_trend(stats.get_untracked().as_ref(), &current));
                    stats.set(Some(current));
                }
                Err(err) => {
                    tracing::warn!(error = %err, "dashboard stats refresh failed");
                    toaster.error(err.to_string());
                }
            }

            match runs_result {
                Ok(list) => runs.set(list),
                Err(err) => {
                    tracing::warn!(error = %err, "recent runs refresh failed");
                    toaster.error(err.to_string());
                }
            }

            loading.set(false);
            refreshing.set(false);
        });
    };

    use_polling(config.poll.dashboard, refresh.clone());

    let stat = move |f: fn(&PipelineStats) -> String| {
        Signal::derive(move || stats.with(|s| s.as_ref().map(f).unwrap_or_else(|| "-".to_string())))
    };
    let success_rate = Signal::derive(move || stats.with(|s| s.as_ref().map_or(0.0, |s| s.success_rate)));
    let failure_rate = Signal::derive(move || {
        stats.with(|s| {
            s.as_ref()
                .filter(|s| s.total_runs > 0)
                .map_or(0.0, |s| 100.0 - s.success_rate)
        })
    });

    view! {
        <div class="view active" role="main" aria-label="Dashboard">
            <div class="page-actions">
                <button
                    class="btn btn-outline"
                    on:click=move |_| refresh()
                    disabled=move || refreshing.get()
                >
                    <Icon kind=IconKind::Refresh/>
                    "Refresh"
                </button>
                <A href="/execute" class="btn btn-primary">
                    <Icon kind=IconKind::Play/>
                    "Execute Pipeline"
                </A>
            </div>

            <Show
                when=move || !loading.get()
                fallback=|| view! { <LoadingSpinner message="Loading dashboard..."/> }
            >
                <div class="stats-grid" role="region" aria-label="Key metrics">
                    <StatCard
                        title="Total Runs"
                        value=stat(|s| format_number(s.total_runs))
                        icon=IconKind::Bolt
                        description="All time pipeline executions"
                    />
                    <StatCard
                        title="Success Rate"
                        value=stat(|s| format_percentage(s.success_rate))
                        icon=IconKind::TrendingUp
                        description="Overall pipeline success"
                        trend=Signal::derive(move || trend.get())
                        variant=StatVariant::Success
                    />
                    <StatCard
                        title="Active Pipelines"
                        value=stat(|s| format_number(s.running_pipelines))
                        icon=IconKind::Clock
                        description="Currently running"
                        variant=StatVariant::Info
                    />
                    <StatCard
                        title="Failed Runs"
                        value=stat(|s| format_number(s.failed_runs))
                        icon=IconKind::XCircle
                        description="Requires attention"
                        variant=StatVariant::Destructive
                    />
                </div>

                <div class="overview-grid">
                    <TableCard title="Pipeline Performance" description="Success vs failed executions">
                        <div class="card-body">
                            <div class="perf-row">
                                <span class="perf-label tone-success">
                                    <Icon kind=IconKind::CheckCircle/>
                                    "Successful"
                                </span>
                                <span class="perf-value tone-success">
                                    {move || stats.with(|s| s.as_ref().map_or(0, |s| s.successful_runs))}
                                </span>
                            </div>
                            <ProgressBar percentage=success_rate variant=StatVariant::Success/>
                            <div class="perf-row">
                                <span class="perf-label tone-destructive">
                                    <Icon kind=IconKind::XCircle/>
                                    "Failed"
                                </span>
                                <span class="perf-value tone-destructive">
                                    {move || stats.with(|s| s.as_ref().map_or(0, |s| s.failed_runs))}
                                </span>
                            </div>
                            <ProgressBar percentage=failure_rate variant=StatVariant::Destructive/>
                            {move || {
                                stats
                                    .with(|s| s.as_ref().and_then(|s| s.avg_duration))
                                    .map(|avg| {
                                        view! {
                                            <InfoRow label="Average Duration">
                                                {format_seconds(avg)}
                                            </InfoRow>
                                        }
                                    })
                            }}
                            {move || {
                                stats
                                    .with(|s| s.as_ref().and_then(|s| s.active_metadata_files))
                                    .map(|count| {
                                        view! {
                                            <InfoRow label="Active Metadata Files">
                                                {count}
                                            </InfoRow>
                                        }
                                    })
                            }}
                        </div>
                    </TableCard>

                    <RecentRuns runs=runs/>

                    <ExecutionMethods stats=stats/>
                </div>
            </Show>
        </div>
    }
}

/// Latest runs, each linking to its logs
#[component]
fn RecentRuns(runs: RwSignal<Vec<PipelineRun>>) -> impl IntoView {
    view! {
        <TableCard title="Recent Pipeline Runs" description="Latest execution activity">
            <Show
                when=move || runs.with(|r| !r.is_empty())
                fallback=|| view! {
                    <EmptyState
                        title="No pipeline runs yet"
                        description="Execute a pipeline to see it here"
                    />
                }
            >
                <div class="run-list">
                    <For
                        each=move || runs.get()
                        key=|r| (r.pipeline_id.clone(), r.status)
                        children=move |run| {
                            view! {
                                <A href=logs_route(&run.pipeline_id) class="run-item">
                                    <div class="run-item-text">
                                        <p class="mono run-id">{run.pipeline_id.clone()}</p>
                                        <p class="run-metadata">{run.metadata_name.clone()}</p>
                                    </div>
                                    <StatusBadge status=run.status/>
                                </A>
                            }
                        }
                    />
                </div>
            </Show>
            <div class="card-footer">
                <A href="/runs" class="btn btn-outline btn-block">"View All Runs"</A>
            </div>
        </TableCard>
    }
}

/// Direct vs Airflow counters; hidden when the backend omits them
#[component]
fn ExecutionMethods(stats: RwSignal<Option<PipelineStats>>) -> impl IntoView {
    let methods = create_memo(move |_| stats.with(|s| s.as_ref().and_then(|s| s.execution_methods)));

    move || {
        methods.get().map(|m| {
            view! {
                <TableCard title="Execution Methods" description="Runs by dispatch path">
                    <table role="table" aria-label="Execution methods">
                        <thead>
                            <tr>
                                <th scope="col">"Method"</th>
                                <th scope="col">"Total"</th>
                                <th scope="col">"Successful"</th>
                                <th scope="col">"Failed"</th>
                            </tr>
                        </thead>
                        <tbody>
                            {[("Direct", m.direct), ("Airflow", m.airflow)]
                                .into_iter()
                                .map(|(label, c)| {
                                    view! {
                                        <tr>
                                            <td>{label}</td>
                                            <td class="mono">{format_number(c.total)}</td>
                                            <td class="mono tone-success">{format_number(c.successful)}</td>
                                            <td class="mono tone-destructive">{format_number(c.failed)}</td>
                                        </tr>
                                    }
                                })
                                .collect_view()}
                        </tbody>
                    </table>
                </TableCard>
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(success_rate: f64) -> PipelineStats {
        PipelineStats {
            success_rate,
            ..PipelineStats::default()
        }
    }

    #[test]
    fn test_success_trend_follows_latest_poll() {
        assert_eq!(success_trend(None, &stats(80.0)), None);

        let up = success_trend(Some(&stats(80.0)), &stats(85.0)).unwrap();
        assert!(up.is_positive);

        // A flat poll clears the previous arrow
        assert_eq!(success_trend(Some(&stats(85.0)), &stats(85.0)), None);
    }
}
