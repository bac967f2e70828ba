//! Metadata management view
//!
//! Lists the pipeline configuration documents known to the backend and
//! provides:
//! - Search by name
//! - Upload of a `.json` file
//! - A side panel with the document and its run statistics
//! - Download of the document as pretty-printed JSON
//! - Delete, soft by default, permanent when "hard delete" is ticked
//!
//! Every mutation is followed by a re-fetch of the list.

use leptos::*;
use serde_json::Value;
use wasm_bindgen_futures::{spawn_local, JsFuture};

use super::guide::MetadataGuide;
use super::icons::{Icon, IconKind};
use super::primitives::{
    Badge, BadgeVariant, EmptyState, InfoRow, LoadingSpinner, ProgressBar, SearchInput,
    StatVariant, TableCard,
};
use super::toast::use_toaster;
use crate::api::ApiClient;
use crate::config::DashboardConfig;
use crate::download::{trigger_download, MIME_JSON};
use crate::polling::{use_liveness, use_polling};
use crate::state::{
    filter_metadata, format_date, format_percentage, format_timestamp, metadata_file_name,
    pretty_json,
};
use crate::types::{MetadataFile, MetadataStats};

/// Whether an upload candidate carries the `.json` extension
pub fn is_json_file_name(name: &str) -> bool {
    name.len() > ".json".len() && name.to_lowercase().ends_with(".json")
}

/// Confirmation prompt for a delete
pub fn delete_prompt(name: &str, hard_delete: bool) -> String {
    if hard_delete {
        format!("Permanently delete {}? This cannot be undone.", name)
    } else {
        format!("Deactivate {}? It stays on disk and can be restored by the backend.", name)
    }
}

async fn read_file(file: &web_sys::File) -> Result<Vec<u8>, String> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "Failed to read file".to_string()))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Metadata list, viewer and mutations
#[component]
pub fn MetadataView() -> impl IntoView {
    let config = expect_context::<DashboardConfig>();
    let api = store_value(expect_context::<ApiClient>());
    let alive = store_value(use_liveness());
    let toaster = use_toaster();

    let files = create_rw_signal(Vec::<MetadataFile>::new());
    let loading = create_rw_signal(true);
    let query = create_rw_signal(String::new());
    let uploading = create_rw_signal(false);

    let viewing = create_rw_signal(None::<String>);
    let document = create_rw_signal(None::<Value>);
    let document_stats = create_rw_signal(None::<MetadataStats>);

    let pending_delete = create_rw_signal(None::<String>);
    let hard_delete = create_rw_signal(false);
    let deleting = create_rw_signal(false);

    let refresh = move || {
        let (Some(api), Some(alive)) = (api.try_get_value(), alive.try_get_value()) else {
            return;
        };
        spawn_local(async move {
            let result = api.list_metadata().await;
            if !alive.is_alive() {
                return;
            }
            match result {
                Ok(list) => files.set(list),
                Err(err) => {
                    tracing::warn!(error = %err, "metadata refresh failed");
                    toaster.error(err.to_string());
                }
            }
            loading.set(false);
        });
    };

    use_polling(config.poll.metadata, refresh);

    let open = move |name: String| {
        let (Some(api), Some(alive)) = (api.try_get_value(), alive.try_get_value()) else {
            return;
        };
        viewing.set(Some(name.clone()));
        document.set(None);
        document_stats.set(None);
        spawn_local(async move {
            let (doc_result, stats_result) =
                futures::join!(api.get_metadata(&name), api.metadata_stats(&name));
            if !alive.is_alive() || viewing.get_untracked().as_deref() != Some(name.as_str()) {
                return;
            }
            match doc_result {
                Ok(doc) => document.set(Some(doc)),
                Err(err) => {
                    toaster.error(err.to_string());
                    viewing.set(None);
                    return;
                }
            }
            match stats_result {
                Ok(stats) => document_stats.set(Some(stats)),
                Err(err) => tracing::debug!(name = %name, error = %err, "no run statistics"),
            }
        });
    };

    let download = move |name: String| {
        let (Some(api), Some(alive)) = (api.try_get_value(), alive.try_get_value()) else {
            return;
        };
        spawn_local(async move {
            let result = api.get_metadata(&name).await;
            if !alive.is_alive() {
                return;
            }
            let outcome = result
                .map_err(|e| e.to_string())
                .and_then(|doc| {
                    trigger_download(&metadata_file_name(&name), &pretty_json(&doc), MIME_JSON)
                        .map_err(|e| e.to_string())
                });
            match outcome {
                Ok(()) => toaster.success(format!("Downloading {}", name)),
                Err(message) => toaster.error(message),
            }
        });
    };

    let confirm_delete = move |_| {
        let Some(name) = pending_delete.get_untracked() else {
            return;
        };
        let (Some(api), Some(alive)) = (api.try_get_value(), alive.try_get_value()) else {
            return;
        };
        let hard = hard_delete.get_untracked();
        deleting.set(true);
        spawn_local(async move {
            let result = api.delete_metadata(&name, hard).await;
            if !alive.is_alive() {
                return;
            }
            deleting.set(false);
            match result {
                Ok(ack) => {
                    tracing::info!(name = %name, hard_delete = hard, "metadata deleted");
                    toaster.success(ack.message_or(&format!("Deleted {}", name)));
                    pending_delete.set(None);
                    hard_delete.set(false);
                    if viewing.get_untracked().as_deref() == Some(name.as_str()) {
                        viewing.set(None);
                    }
                    refresh();
                }
                Err(err) => toaster.error(err.to_string()),
            }
        });
    };

    let upload = move |ev: ev::Event| {
        let input = event_target::<web_sys::HtmlInputElement>(&ev);
        let Some(file) = input.files().and_then(|list| list.get(0)) else {
            return;
        };
        input.set_value("");

        let name = file.name();
        if !is_json_file_name(&name) {
            toaster.error("Only .json metadata files can be uploaded");
            return;
        }
        let (Some(api), Some(alive)) = (api.try_get_value(), alive.try_get_value()) else {
            return;
        };

        uploading.set(true);
        spawn_local(async move {
            let result = match read_file(&file).await {
                Ok(bytes) => api.upload_metadata(&name, bytes).await.map_err(|e| e.to_string()),
                Err(message) => Err(message),
            };
            if !alive.is_alive() {
                return;
            }
            uploading.set(false);
            match result {
                Ok(ack) => {
                    tracing::info!(name = %name, "metadata uploaded");
                    toaster.success(ack.message_or(&format!("Uploaded {}", name)));
                    refresh();
                }
                Err(message) => toaster.error(message),
            }
        });
    };

    let filtered = create_memo(move |_| files.with(|f| filter_metadata(f, &query.get())));

    view! {
        <div class="view active" role="main" aria-label="Metadata">
            <div class="toolbar">
                <SearchInput value=query placeholder="Search metadata files..."/>
                <label class="btn btn-primary" class:disabled=move || uploading.get()>
                    <Icon kind=IconKind::Upload/>
                    {move || if uploading.get() { "Uploading..." } else { "Upload Metadata" }}
                    <input
                        type="file"
                        accept=".json,application/json"
                        class="visually-hidden"
                        disabled=move || uploading.get()
                        on:change=upload
                    />
                </label>
            </div>

            <Show when=move || pending_delete.with(Option::is_some)>
                <div class="confirm-card" role="alertdialog" aria-label="Confirm delete">
                    <p>
                        {move || {
                            pending_delete
                                .get()
                                .map(|name| delete_prompt(&name, hard_delete.get()))
                        }}
                    </p>
                    <label class="checkbox">
                        <input
                            type="checkbox"
                            prop:checked=move || hard_delete.get()
                            on:change=move |ev| hard_delete.set(event_target_checked(&ev))
                        />
                        <span>"Hard delete (remove the file permanently)"</span>
                    </label>
                    <div class="confirm-actions">
                        <button
                            class="btn btn-outline"
                            on:click=move |_| {
                                pending_delete.set(None);
                                hard_delete.set(false);
                            }
                        >
                            "Cancel"
                        </button>
                        <button
                            class="btn btn-destructive"
                            disabled=move || deleting.get()
                            on:click=confirm_delete
                        >
                            <Icon kind=IconKind::Trash/>
                            "Delete"
                        </button>
                    </div>
                </div>
            </Show>

            <div class="split">
                <TableCard title="Metadata Files" description="Pipeline configuration JSON files">
                    <Show
                        when=move || !loading.get()
                        fallback=|| view! { <LoadingSpinner message="Loading metadata..."/> }
                    >
                        <Show
                            when=move || filtered.with(|f| !f.is_empty())
                            fallback=|| view! {
                                <EmptyState
                                    title="No metadata files found"
                                    description="Upload a metadata file or adjust your search"
                                />
                            }
                        >
                            <table role="table" aria-label="Metadata files">
                                <thead>
                                    <tr>
                                        <th scope="col">"Name"</th>
                                        <th scope="col">"Version"</th>
                                        <th scope="col">"Status"</th>
                                        <th scope="col">"Updated"</th>
                                        <th scope="col" class="text-right">"Actions"</th>
                                    </tr>
                                </thead>
                                <tbody>
                                    <For
                                        each=move || filtered.get()
                                        key=|f| (f.name.clone(), f.is_active, f.updated_at.clone())
                                        children=move |file| {
                                            let view_name = file.name.clone();
                                            let download_name = file.name.clone();
                                            let delete_name = file.name.clone();
                                            let updated = if file.updated_at.is_empty() {
                                                format_date(&file.created_at)
                                            } else {
                                                format_date(&file.updated_at)
                                            };
                                            view! {
                                                <tr>
                                                    <td>
                                                        <span class="file-name">
                                                            <Icon kind=IconKind::FileJson class="icon-sm"/>
                                                            {file.name.clone()}
                                                        </span>
                                                        {file.description.clone().map(|d| view! { <p class="muted">{d}</p> })}
                                                    </td>
                                                    <td class="muted">
                                                        {file.version.clone().map_or("-".to_string(), |v| format!("v{}", v))}
                                                    </td>
                                                    <td>
                                                        {if file.is_active {
                                                            view! { <Badge text="Active" variant=BadgeVariant::Success/> }.into_view()
                                                        } else {
                                                            view! { <Badge text="Inactive" variant=BadgeVariant::Secondary/> }.into_view()
                                                        }}
                                                    </td>
                                                    <td class="muted">{updated}</td>
                                                    <td class="text-right actions">
                                                        <button
                                                            class="btn btn-ghost"
                                                            title="View"
                                                            aria-label="View document"
                                                            on:click=move |_| open(view_name.clone())
                                                        >
                                                            <Icon kind=IconKind::Eye/>
                                                        </button>
                                                        <button
                                                            class="btn btn-ghost"
                                                            title="Download"
                                                            aria-label="Download document"
                                                            on:click=move |_| download(download_name.clone())
                                                        >
                                                            <Icon kind=IconKind::Download/>
                                                        </button>
                                                        <button
                                                            class="btn btn-ghost tone-destructive"
                                                            title="Delete"
                                                            aria-label="Delete document"
                                                            on:click=move |_| pending_delete.set(Some(delete_name.clone()))
                                                        >
                                                            <Icon kind=IconKind::Trash/>
                                                        </button>
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

                <Show when=move || viewing.with(Option::is_some)>
                    <DocumentPanel viewing=viewing document=document stats=document_stats/>
                </Show>
            </div>

            <MetadataGuide/>
        </div>
    }
}

#[component]
fn DocumentPanel(
    viewing: RwSignal<Option<String>>,
    document: RwSignal<Option<Value>>,
    stats: RwSignal<Option<MetadataStats>>,
) -> impl IntoView {
    let success_rate = Signal::derive(move || stats.with(|s| s.as_ref().map_or(0.0, |s| s.success_rate)));

    view! {
        <aside class="table-card side-panel" role="region" aria-label="Metadata document">
            <div class="table-header">
                <div class="table-title mono">{move || viewing.get().unwrap_or_default()}</div>
                <button
                    class="btn btn-ghost"
                    aria-label="Close panel"
                    on:click=move |_| viewing.set(None)
                >
                    <Icon kind=IconKind::Close/>
                </button>
            </div>
            <div class="card-body">
                {move || {
                    stats.get().map(|s| {
                        let rate = format_percentage(s.success_rate);
                        let last_run = s.last_run.as_deref().map_or("-".to_string(), format_timestamp);
                        view! {
                            <InfoRow label="Total Runs">{s.total_runs}</InfoRow>
                            <InfoRow label="Successful">{s.successful_runs}</InfoRow>
                            <InfoRow label="Failed">{s.failed_runs}</InfoRow>
                            <InfoRow label="Success Rate">{rate}</InfoRow>
                            <ProgressBar percentage=success_rate variant=StatVariant::Success/>
                            <InfoRow label="Last Run">{last_run}</InfoRow>
                        }
                    })
                }}
                {move || match document.get() {
                    Some(doc) => view! { <pre class="code-block">{pretty_json(&doc)}</pre> }.into_view(),
                    None => view! { <LoadingSpinner message="Loading document..."/> }.into_view(),
                }}
            </div>
        </aside>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_json_file_name() {
        assert!(is_json_file_name("motor_insurance_config_v2.json"));
        assert!(is_json_file_name("CLAIMS.JSON"));
        assert!(!is_json_file_name(".json"));
        assert!(!is_json_file_name("notes.txt"));
        assert!(!is_json_file_name("config.json.bak"));
    }

    #[test]
    fn test_delete_prompt() {
        assert!(delete_prompt("a.json", true).starts_with("Permanently delete a.json"));
        assert!(delete_prompt("a.json", false).starts_with("Deactivate a.json"));
    }
}
