//! Dashboard UI components
//!
//! Leptos components for the pipeline dashboard.
//!
//! ## Architecture
//!
//! The component hierarchy follows a layered design:
//!
//! 1. **Primitives** (`primitives.rs`, `status_badge.rs`) - Reusable building blocks
//!    - Loading and empty states: `LoadingSpinner`, `EmptyState`
//!    - Data display: `StatCard`, `TableCard`, `Badge`, `StatusBadge`, `ProgressBar`, `InfoRow`
//!    - Forms: `SearchInput`
//!
//! 2. **Icons** (`icons.rs`) - Inline SVG icons for air-gapped deployments
//!
//! 3. **Notifications** (`toast.rs`) - `Toaster` context and the `Toasts` stack
//!
//! 4. **Layout** (`header.rs`, `sidebar.rs`) - Structural components
//!
//! 5. **Views** (`dashboard.rs`, `runs.rs`, `metadata.rs`, `execute.rs`,
//!    `logs.rs`, `health.rs`) - Page-level components. Each page owns its
//!    data and its polling loop.
//!
//! ## Accessibility
//!
//! All components include ARIA attributes for screen reader support.

pub mod dashboard;
pub mod execute;
pub mod guide;
pub mod header;
pub mod health;
pub mod icons;
pub mod logs;
pub mod metadata;
pub mod primitives;
pub mod runs;
pub mod sidebar;
pub mod status_badge;
pub mod toast;

// Re-export layout components
pub use header::Header;
pub use sidebar::Sidebar;

// Re-export views
pub use dashboard::DashboardView;
pub use execute::ExecuteView;
pub use health::HealthView;
pub use logs::LogsView;
pub use metadata::MetadataView;
pub use runs::RunsView;

// Re-export primitives for convenient access
pub use primitives::{
    Badge, BadgeVariant, EmptyState, InfoRow, LoadingSpinner, ProgressBar, SearchInput, StatCard,
    StatVariant, TableCard, Trend,
};
pub use status_badge::{status_style, StatusBadge, StatusStyle};
pub use toast::{provide_toaster, use_toaster, Toaster, Toasts};
