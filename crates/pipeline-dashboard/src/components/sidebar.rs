//! Sidebar navigation component
//!
//! Branding, one link per page with active state highlighting, and the
//! backend/version footer.

use leptos::*;
use leptos_router::*;

use super::icons::{Icon, IconKind};
use crate::config::DashboardConfig;

/// Navigation entries in display order
pub const NAV_ITEMS: [(&str, &str, IconKind); 6] = [
    ("Dashboard", "/", IconKind::Home),
    ("Pipeline Runs", "/runs", IconKind::Play),
    ("Metadata", "/metadata", IconKind::FileJson),
    ("Execute Pipeline", "/execute", IconKind::Bolt),
    ("Logs", "/logs", IconKind::DocumentText),
    ("Health", "/health", IconKind::Shield),
];

/// Sidebar navigation with branding and footer
#[component]
pub fn Sidebar() -> impl IntoView {
    let config = expect_context::<DashboardConfig>();
    let version = config
        .version
        .clone()
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
    let api_url = config.api_url().to_string();

    view! {
        <aside class="sidebar" role="navigation" aria-label="Main navigation">
            <div class="logo" aria-label="Ominimo Pipeline">
                <div class="logo-icon" aria-hidden="true">"O"</div>
                <span class="logo-text">"Ominimo Pipeline"</span>
            </div>

            <nav class="nav" aria-label="Primary">
                {NAV_ITEMS
                    .iter()
                    .map(|(label, href, icon)| {
                        view! {
                            <A href=*href class="nav-link" active_class="active" exact=true>
                                <Icon kind=*icon/>
                                <span>{*label}</span>
                            </A>
                        }
                    })
                    .collect_view()}
            </nav>

            <div class="sidebar-footer">
                <div class="sidebar-stat">
                    <span class="sidebar-stat-label">"Backend"</span>
                    <span class="sidebar-stat-value" title=api_url.clone()>{api_url}</span>
                </div>
                <p class="sidebar-version">{format!("Motor Insurance Pipeline v{}", version)}</p>
            </div>
        </aside>
    }
}
