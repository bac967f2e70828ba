//! Header component
//!
//! The top bar showing the current page title and subtitle, derived from the
//! route.

use leptos::*;
use leptos_router::use_location;

/// Title and subtitle for a route path
pub fn page_heading(path: &str) -> (&'static str, &'static str) {
    match path.trim_end_matches('/') {
        "" => ("Dashboard", "Motor insurance pipeline monitoring and control"),
        "/runs" => ("Pipeline Runs", "Execution history and run control"),
        "/metadata" => ("Metadata", "Pipeline configuration documents"),
        "/execute" => ("Execute Pipeline", "Start a new pipeline run"),
        "/logs" => ("Logs", "Per-run log entries and stage timeline"),
        "/health" => ("Health", "Backend and integration status"),
        _ => ("Not Found", "This page does not exist"),
    }
}

/// Page header
#[component]
pub fn Header() -> impl IntoView {
    let location = use_location();
    let heading = create_memo(move |_| page_heading(&location.pathname.get()));

    view! {
        <header class="header" role="banner">
            <div class="header-left">
                <h1 class="header-title" aria-live="polite">
                    {move || heading.get().0}
                </h1>
                <p class="header-subtitle">{move || heading.get().1}</p>
            </div>
        </header>
    }
}
