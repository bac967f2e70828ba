//! Run status badge
//!
//! The style table is an exhaustive match over [`RunStatus`]: adding a status
//! variant does not compile until it has a label, icon and color here.

use leptos::*;

use super::icons::{Icon, IconKind};
use super::primitives::BadgeVariant;
use crate::types::RunStatus;

/// Label, icon and color of one status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub label: &'static str,
    pub icon: IconKind,
    pub variant: BadgeVariant,
    pub spinning: bool,
}

pub fn status_style(status: RunStatus) -> StatusStyle {
    let (label, icon, variant, spinning) = match status {
        RunStatus::Running => ("Running", IconKind::Spinner, BadgeVariant::Info, true),
        RunStatus::Success => ("Success", IconKind::CheckCircle, BadgeVariant::Success, false),
        RunStatus::Failed => ("Failed", IconKind::XCircle, BadgeVariant::Error, false),
        RunStatus::Pending => ("Pending", IconKind::Clock, BadgeVariant::Warning, false),
        RunStatus::Cancelled => ("Cancelled", IconKind::Ban, BadgeVariant::Secondary, false),
        RunStatus::Queued => ("Queued", IconKind::Queue, BadgeVariant::Warning, false),
        RunStatus::QueuedAirflow => ("Queued (Airflow)", IconKind::Queue, BadgeVariant::Info, false),
        RunStatus::Unknown => ("Unknown", IconKind::Question, BadgeVariant::Outline, false),
    };

    StatusStyle {
        label,
        icon,
        variant,
        spinning,
    }
}

/// Badge for a run status
#[component]
pub fn StatusBadge(status: RunStatus) -> impl IntoView {
    let style = status_style(status);

    view! {
        <span class=style.variant.class() title=status.as_str()>
            <Icon kind=style.icon spin=style.spinning class="icon-sm"/>
            {style.label}
        </span>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_status_has_distinct_label() {
        let labels: HashSet<_> = RunStatus::ALL.iter().map(|s| status_style(*s).label).collect();
        assert_eq!(labels.len(), RunStatus::ALL.len());
    }

    #[test]
    fn test_only_running_spins() {
        for status in RunStatus::ALL {
            assert_eq!(status_style(status).spinning, status == RunStatus::Running);
        }
    }

    #[test]
    fn test_known_styles() {
        let failed = status_style(RunStatus::Failed);
        assert_eq!(failed.label, "Failed");
        assert_eq!(failed.variant, BadgeVariant::Error);

        let queued = status_style(RunStatus::QueuedAirflow);
        assert_eq!(queued.icon, IconKind::Queue);
    }
}
