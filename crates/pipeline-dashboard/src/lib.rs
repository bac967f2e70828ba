//! Pipeline Dashboard - Leptos-based WebAssembly UI
//!
//! A reactive dashboard for monitoring and controlling a data-pipeline
//! execution service over its HTTP/JSON API.
//! Built with Leptos framework and compiled to WebAssembly.
//!
//! ## Features
//!
//! - **Live Monitoring**: each page polls its own data (5-10 s)
//! - **Pipeline Runs**: search, status filter, cancel, JSON export
//! - **Metadata**: upload, view, download, soft or hard delete
//! - **Execution**: start runs directly, via Airflow, or let the backend decide
//! - **Logs**: per-run log viewer with stage timeline and text export
//! - **Health**: backend, database and Airflow status
//! - **Air-Gapped**: no external network requests (fonts, CDNs, etc.)
//!
//! ## Configuration
//!
//! The backend URL can be injected without rebuilding:
//!
//! ```html
//! <!-- Server injects config via meta tags -->
//! <meta name="pipeline:api-url" content="http://pipeline.local:8000">
//! <meta name="pipeline:version" content="1.0">
//! <meta name="pipeline:log-level" content="debug">
//! ```
//!
//! Or via JavaScript:
//!
//! ```javascript
//! window.__PIPELINE_CONFIG__ = {
//!     api_url: "http://pipeline.local:8000"
//! };
//! ```
//!
//! Otherwise `PIPELINE_API_BASE_URL` at build time, then `http://localhost:8000`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     Browser                             │
//! │  ┌─────────────────────────────────────────────────┐    │
//! │  │           pipeline-dashboard (WASM)             │    │
//! │  │  ┌─────────┐  ┌───────────┐  ┌──────────────┐   │    │
//! │  │  │ Leptos  │→ │ ApiClient │→ │ gloo-net     │   │    │
//! │  │  │ pages   │  │ Transport │  │ fetch        │   │    │
//! │  │  └─────────┘  └───────────┘  └──────────────┘   │    │
//! │  └─────────────────────────────────────────────────┘    │
//! └──────────────────────────┬──────────────────────────────┘
//!                            │ HTTP/JSON
//! ┌──────────────────────────▼──────────────────────────────┐
//! │                pipeline execution service               │
//! │      /health  /metadata  /pipeline  /logs  /stats       │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod components;
pub mod config;
pub mod download;
pub mod polling;
pub mod state;
pub mod types;

use leptos::*;
use leptos_router::*;

use api::ApiClient;
use components::{
    provide_toaster, DashboardView, ExecuteView, Header, HealthView, LogsView, MetadataView,
    RunsView, Sidebar, Toasts,
};
use config::DashboardConfig;

/// Main dashboard application component
#[component]
pub fn App(config: DashboardConfig) -> impl IntoView {
    if let Err(err) = config.validate() {
        tracing::warn!(error = %err, api_url = config.api_url(), "questionable dashboard configuration");
    }
    tracing::info!(api_url = config.api_url(), "pipeline dashboard starting");

    provide_context(ApiClient::from_config(&config));
    provide_context(config);
    provide_toaster();

    view! {
        <Router>
            <div class="app">
                <Sidebar/>
                <main class="main">
                    <Header/>
                    <div class="content">
                        <Routes>
                            <Route path="/" view=DashboardView/>
                            <Route path="/runs" view=RunsView/>
                            <Route path="/metadata" view=MetadataView/>
                            <Route path="/execute" view=ExecuteView/>
                            <Route path="/logs" view=LogsView/>
                            <Route path="/health" view=HealthView/>
                        </Routes>
                    </div>
                </main>
                <Toasts/>
            </div>
        </Router>
    }
}

/// Mount the application to the DOM
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    // Initialize panic hook for better error messages
    console_error_panic_hook::set_once();

    let config = DashboardConfig::load();
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(config.log_level)
            .build(),
    );

    mount_to_body(move || view! { <App config=config/> });
}
