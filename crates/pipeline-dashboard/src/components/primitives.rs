//! Reusable UI primitive components
//!
//! This module provides the foundational building blocks for the dashboard UI:
//! - Loading spinner
//! - Empty states
//! - Badges and progress bars
//! - Stat cards, table cards and info rows
//! - Search input

use leptos::*;

use super::icons::{Icon, IconKind};

// ============================================================================
// Loading States
// ============================================================================

/// Loading spinner with optional message
#[component]
pub fn LoadingSpinner(#[prop(optional)] message: Option<&'static str>) -> impl IntoView {
    view! {
        <div class="loading-spinner" role="status" aria-live="polite">
            <Icon kind=IconKind::Refresh spin=true class="icon-lg"/>
            {message.map(|msg| view! { <span class="loading-message">{msg}</span> })}
        </div>
    }
}

// ============================================================================
// Empty States
// ============================================================================

/// Generic empty state component
#[component]
pub fn EmptyState(
    title: &'static str,
    #[prop(optional)] description: Option<&'static str>,
) -> impl IntoView {
    view! {
        <div class="empty-state" role="status">
            <div class="empty-icon">
                <Icon kind=IconKind::Info/>
            </div>
            <div class="empty-text">{title}</div>
            {description.map(|desc| view! { <p class="empty-description">{desc}</p> })}
        </div>
    }
}

// ============================================================================
// Badges & Indicators
// ============================================================================

/// Badge variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BadgeVariant {
    #[default]
    Default,
    Secondary,
    Outline,
    Success,
    Warning,
    Error,
    Info,
}

impl BadgeVariant {
    pub fn class(&self) -> &'static str {
        match self {
            BadgeVariant::Default => "badge",
            BadgeVariant::Secondary => "badge badge-secondary",
            BadgeVariant::Outline => "badge badge-outline",
            BadgeVariant::Success => "badge badge-success",
            BadgeVariant::Warning => "badge badge-warning",
            BadgeVariant::Error => "badge badge-error",
            BadgeVariant::Info => "badge badge-info",
        }
    }
}

/// Badge component with text
#[component]
pub fn Badge<T: IntoView + 'static>(
    text: T,
    #[prop(optional)] variant: BadgeVariant,
    #[prop(optional, default = false)] with_dot: bool,
) -> impl IntoView {
    view! {
        <span class=variant.class()>
            {with_dot.then(|| view! { <span class="badge-dot"></span> })}
            {text}
        </span>
    }
}

/// Horizontal bar filled to `percentage`
#[component]
pub fn ProgressBar(
    #[prop(into)] percentage: Signal<f64>,
    #[prop(optional)] variant: StatVariant,
) -> impl IntoView {
    view! {
        <div
            class="progress"
            role="progressbar"
            aria-valuemin=0
            aria-valuemax=100
            aria-valuenow=move || percentage.get().round() as i64
        >
            <div
                class=format!("progress-fill {}", variant.class())
                style=move || format!("width: {}%", crate::state::bar_width(percentage.get()))
            ></div>
        </div>
    }
}

// ============================================================================
// Cards & Containers
// ============================================================================

/// Color treatment of a stat card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatVariant {
    #[default]
    Default,
    Success,
    Warning,
    Destructive,
    Info,
}

impl StatVariant {
    pub fn class(&self) -> &'static str {
        match self {
            StatVariant::Default => "tone-default",
            StatVariant::Success => "tone-success",
            StatVariant::Warning => "tone-warning",
            StatVariant::Destructive => "tone-destructive",
            StatVariant::Info => "tone-info",
        }
    }
}

/// Change of a metric between two observations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    pub value: f64,
    pub is_positive: bool,
}

impl Trend {
    /// Trend from `previous` to `current`, or `None` when nothing changed
    pub fn between(previous: f64, current: f64) -> Option<Self> {
        let delta = current - previous;
        if !delta.is_finite() || delta.abs() < 0.05 {
            return None;
        }
        Some(Self {
            value: (delta * 10.0).round() / 10.0,
            is_positive: delta > 0.0,
        })
    }

    /// Arrow plus magnitude, e.g. `↑ 2.5%`
    pub fn label(&self) -> String {
        let arrow = if self.is_positive { "↑" } else { "↓" };
        format!("{} {}%", arrow, self.value.abs())
    }

    pub fn class(&self) -> &'static str {
        if self.is_positive {
            "trend trend-up"
        } else {
            "trend trend-down"
        }
    }
}

/// Stat card for overview metrics
#[component]
pub fn StatCard(
    title: &'static str,
    #[prop(into)] value: Signal<String>,
    icon: IconKind,
    #[prop(optional)] description: Option<&'static str>,
    #[prop(optional, into)] trend: MaybeSignal<Option<Trend>>,
    #[prop(optional)] variant: StatVariant,
) -> impl IntoView {
    let tone = variant.class();

    view! {
        <div class=format!("stat-card {}", tone)>
            <div class="stat-header">
                <span class="stat-label">{title}</span>
                <div class="stat-icon"><Icon kind=icon/></div>
            </div>
            <div class="stat-value" aria-label=format!("{}: ", title)>
                {move || value.get()}
            </div>
            {description.map(|desc| view! { <p class="stat-description">{desc}</p> })}
            {move || trend.get().map(|t| view! { <p class=t.class()>{t.label()}</p> })}
        </div>
    }
}

/// Table card container
#[component]
pub fn TableCard(
    title: &'static str,
    #[prop(optional)] description: Option<&'static str>,
    children: Children,
) -> impl IntoView {
    view! {
        <div class="table-card">
            <div class="table-header">
                <div class="table-title-group">
                    <div class="table-title">{title}</div>
                    {description.map(|desc| view! { <p class="table-description">{desc}</p> })}
                </div>
            </div>
            {children()}
        </div>
    }
}

// ============================================================================
// Info Rows
// ============================================================================

/// Key-value info row with children for the value
#[component]
pub fn InfoRow(label: &'static str, children: Children) -> impl IntoView {
    view! {
        <div class="info-row">
            <span class="info-label">{label}</span>
            <span class="info-value">
                {children()}
            </span>
        </div>
    }
}

// ============================================================================
// Search
// ============================================================================

/// Search input bound to a string signal
#[component]
pub fn SearchInput(
    #[prop(into)] value: RwSignal<String>,
    #[prop(optional, default = "Search...")] placeholder: &'static str,
) -> impl IntoView {
    view! {
        <div class="search-bar">
            <div class="search-icon" aria-hidden="true">
                <Icon kind=IconKind::Search/>
            </div>
            <input
                type="search"
                placeholder=placeholder
                class="search-input"
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
                aria-label=placeholder
            />
        </div>
    }
}
