//! Health view
//!
//! Backend health snapshot, the root service banner and the Airflow DAGs the
//! backend knows about. Only the health fetch is essential; a missing banner
//! or DAG list does not raise a notification.

use leptos::*;
use wasm_bindgen_futures::spawn_local;

use super::icons::{Icon, IconKind};
use super::primitives::{
    Badge, BadgeVariant, EmptyState, InfoRow, LoadingSpinner, StatCard, StatVariant, TableCard,
};
use super::toast::use_toaster;
use crate::api::ApiClient;
use crate::config::DashboardConfig;
use crate::polling::{use_liveness, use_polling};
use crate::state::{format_number, format_timestamp};
use crate::types::{AirflowDag, HealthState, HealthStatus, ServiceInfo};

pub fn health_variant(state: HealthState) -> BadgeVariant {
    match state {
        HealthState::Healthy => BadgeVariant::Success,
        HealthState::Degraded => BadgeVariant::Warning,
        HealthState::Unhealthy => BadgeVariant::Error,
    }
}

fn health_tone(state: HealthState) -> StatVariant {
    match state {
        HealthState::Healthy => StatVariant::Success,
        HealthState::Degraded => StatVariant::Warning,
        HealthState::Unhealthy => StatVariant::Destructive,
    }
}

/// Badge color for a free-form component state such as `database` or
/// `airflow`
pub fn component_variant(value: &str) -> BadgeVariant {
    match value.trim().to_lowercase().as_str() {
        "healthy" | "ok" | "connected" | "available" | "operational" => BadgeVariant::Success,
        "degraded" | "disabled" | "not_configured" | "not configured" => BadgeVariant::Warning,
        "" | "n/a" => BadgeVariant::Secondary,
        _ => BadgeVariant::Error,
    }
}

/// Status heading shown next to the badge
pub fn health_heading(health: &HealthStatus) -> String {
    health.status.as_str().to_uppercase()
}

/// Health dashboard
#[component]
pub fn HealthView() -> impl IntoView {
    let api = expect_context::<ApiClient>();
    let config = expect_context::<DashboardConfig>();
    let toaster = use_toaster();
    let alive = use_liveness();

    let health = create_rw_signal(None::<HealthStatus>);
    let service = create_rw_signal(None::<ServiceInfo>);
    let dags = create_rw_signal(None::<Vec<AirflowDag>>);
    let loading = create_rw_signal(true);

    use_polling(config.poll.health, move || {
        let api = api.clone();
        let alive = alive.clone();
        spawn_local(async move {
            let (health_result, service_result, dags_result) =
                futures::join!(api.health(), api.service_info(), api.airflow_dags());
            if !alive.is_alive() {
                return;
            }

            match health_result {
                Ok(snapshot) => health.set(Some(snapshot)),
                Err(err) => {
                    tracing::warn!(error = %err, "health check failed");
                    toaster.error(err.to_string());
                }
            }
            match service_result {
                Ok(info) => service.set(Some(info)),
                Err(err) => tracing::debug!(error = %err, "service banner unavailable"),
            }
            match dags_result {
                Ok(list) => dags.set(Some(list)),
                Err(err) => {
                    tracing::debug!(error = %err, "airflow dags unavailable");
                    dags.set(None);
                }
            }
            loading.set(false);
        });
    });

    let state = Signal::derive(move || health.with(|h| h.as_ref().map(|h| h.status).unwrap_or_default()));

    view! {
        <div class="view active" role="main" aria-label="System health">
            <Show
                when=move || !loading.get()
                fallback=|| view! { <LoadingSpinner message="Checking health..."/> }
            >
                {move || {
                    health
                        .get()
                        .map(|h| {
                            view! {
                                <div class="health-banner">
                                    <span class=format!("{} badge-lg", health_variant(h.status).class())>
                                        <Icon kind=IconKind::Shield/>
                                        {health_heading(&h)}
                                    </span>
                                    <span class="health-active">
                                        {format!("Active Pipelines: {}", h.active_pipelines)}
                                    </span>
                                </div>
                            }
                        })
                }}

                <div class="stats-grid" role="region" aria-label="Health metrics">
                    {move || {
                        let tone = health_tone(state.get());
                        view! {
                            <StatCard
                                title="System Status"
                                value=Signal::derive(move || state.get().as_str().to_string())
                                icon=IconKind::CheckCircle
                                variant=tone
                            />
                        }
                    }}
                    <StatCard
                        title="Active Pipelines"
                        value=Signal::derive(move || {
                            health.with(|h| h.as_ref().map_or("-".to_string(), |h| format_number(h.active_pipelines)))
                        })
                        icon=IconKind::Bolt
                        description="Currently running"
                        variant=StatVariant::Info
                    />
                    <StatCard
                        title="Database"
                        value=Signal::derive(move || component_label(health.with(|h| h.as_ref().and_then(|h| h.database.clone()))))
                        icon=IconKind::Database
                    />
                    <StatCard
                        title="Airflow"
                        value=Signal::derive(move || component_label(health.with(|h| h.as_ref().and_then(|h| h.airflow.clone()))))
                        icon=IconKind::Queue
                    />
                </div>

                <div class="overview-grid">
                    <TableCard title="Service" description="Backend identity and last check">
                        <div class="card-body">
                            <InfoRow label="Message">
                                {move || service.with(|s| s.as_ref().and_then(|s| s.message.clone()).unwrap_or_else(|| "-".to_string()))}
                            </InfoRow>
                            <InfoRow label="Version">
                                {move || service.with(|s| s.as_ref().and_then(|s| s.version.clone()).unwrap_or_else(|| "-".to_string()))}
                            </InfoRow>
                            <InfoRow label="Database">
                                <ComponentBadge value=Signal::derive(move || health.with(|h| h.as_ref().and_then(|h| h.database.clone())))/>
                            </InfoRow>
                            <InfoRow label="Airflow">
                                <ComponentBadge value=Signal::derive(move || health.with(|h| h.as_ref().and_then(|h| h.airflow.clone())))/>
                            </InfoRow>
                            <InfoRow label="Last Check">
                                {move || health.with(|h| h.as_ref().map_or("-".to_string(), |h| format_timestamp(&h.timestamp)))}
                            </InfoRow>
                        </div>
                    </TableCard>

                    <DagTable dags=dags/>
                </div>
            </Show>
        </div>
    }
}

fn component_label(value: Option<String>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or_else(|| "n/a".to_string())
}

#[component]
fn ComponentBadge(#[prop(into)] value: Signal<Option<String>>) -> impl IntoView {
    move || {
        let text = component_label(value.get());
        let variant = component_variant(&text);
        view! { <Badge text=text variant=variant with_dot=true/> }
    }
}

#[component]
fn DagTable(dags: RwSignal<Option<Vec<AirflowDag>>>) -> impl IntoView {
    view! {
        <TableCard title="Airflow DAGs" description="Workflows registered with the scheduler">
            {move || match dags.get() {
                None => view! {
                    <EmptyState title="Airflow unavailable" description="The backend did not return a DAG list"/>
                }
                .into_view(),
                Some(list) if list.is_empty() => view! { <EmptyState title="No DAGs registered"/> }.into_view(),
                Some(list) => view! {
                    <table role="table" aria-label="Airflow DAGs">
                        <thead>
                            <tr>
                                <th scope="col">"DAG"</th>
                                <th scope="col">"Description"</th>
                                <th scope="col">"Tags"</th>
                                <th scope="col">"State"</th>
                            </tr>
                        </thead>
                        <tbody>
                            {list
                                .into_iter()
                                .map(|dag| {
                                    let (label, variant) = match (dag.is_paused, dag.is_active) {
                                        (true, _) => ("Paused", BadgeVariant::Warning),
                                        (false, true) => ("Active", BadgeVariant::Success),
                                        (false, false) => ("Inactive", BadgeVariant::Secondary),
                                    };
                                    view! {
                                        <tr>
                                            <td class="mono">{dag.dag_id}</td>
                                            <td class="muted">{dag.description.unwrap_or_default()}</td>
                                            <td>
                                                {dag.tags
                                                    .into_iter()
                                                    .map(|tag| view! { <Badge text=tag variant=BadgeVariant::Outline/> })
                                                    .collect_view()}
                                            </td>
                                            <td><Badge text=label variant=variant/></td>
                                        </tr>
                                    }
                                })
                                .collect_view()}
                        </tbody>
                    </table>
                }
                .into_view(),
            }}
        </TableCard>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_variant() {
        assert_eq!(health_variant(HealthState::Healthy), BadgeVariant::Success);
        assert_eq!(health_variant(HealthState::Degraded), BadgeVariant::Warning);
        assert_eq!(health_variant(HealthState::Unhealthy), BadgeVariant::Error);
    }

    #[test]
    fn test_health_heading_from_backend_payload() {
        let health: HealthStatus = serde_json::from_str(
            r#"{"status":"healthy","active_pipelines":3,"database":"healthy","timestamp":"2024-01-15T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(health_heading(&health), "HEALTHY");
        assert_eq!(format!("Active Pipelines: {}", health.active_pipelines), "Active Pipelines: 3");
    }

    #[test]
    fn test_component_variant() {
        assert_eq!(component_variant("healthy"), BadgeVariant::Success);
        assert_eq!(component_variant("Connected"), BadgeVariant::Success);
        assert_eq!(component_variant("unhealthy"), BadgeVariant::Error);
        assert_eq!(component_variant("disabled"), BadgeVariant::Warning);
        assert_eq!(component_label(None), "n/a");
        assert_eq!(component_variant(&component_label(None)), BadgeVariant::Secondary);
    }
}
