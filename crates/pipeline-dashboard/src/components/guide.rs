//! Metadata authoring guide
//!
//! Static reference for writing pipeline metadata documents, rendered as
//! collapsible sections on the Metadata page. The backend owns the actual
//! schema; this only mirrors what it accepts.

use leptos::*;

use super::icons::{Icon, IconKind};
use super::primitives::{Badge, BadgeVariant};

pub struct GuideSection {
    pub title: &'static str,
    pub icon: IconKind,
    pub example: Option<&'static str>,
    /// `(term, explanation)`; an empty explanation renders the term alone
    pub items: &'static [(&'static str, &'static str)],
    pub variant: BadgeVariant,
}

pub const GUIDE_SECTIONS: &[GuideSection] = &[
    GuideSection {
        title: "Basic Structure",
        icon: IconKind::Info,
        example: Some(
            r#"{
  "version": "1.0.0",
  "description": "Pipeline description",
  "dataflows": [{
    "name": "unique-pipeline-name",
    "description": "What this pipeline does",
    "version": "1.0.0",
    "sources": [...],
    "transformations": [...],
    "sinks": [...],
    "settings": {...}
  }]
}"#,
        ),
        items: &[
            ("sources", "Required. Where to read input data"),
            ("sinks", "Required. Where to save output data"),
            ("transformations", "Optional. Process and validate data"),
        ],
        variant: BadgeVariant::Outline,
    },
    GuideSection {
        title: "Data Sources",
        icon: IconKind::Database,
        example: Some(
            r#"{
  "name": "raw_policies",
  "path": "/app/data/input/events/motor_policy/*",
  "format": "JSON",
  "options": { "multiLine": false }
}"#,
        ),
        items: &[
            ("JSON", ""),
            ("CSV", ""),
            ("PARQUET", ""),
            ("AVRO", ""),
            ("/app/", "Paths must start here"),
            ("*.json", "Wildcards select multiple files"),
            ("/app/data/input/", "Input directory"),
        ],
        variant: BadgeVariant::Default,
    },
    GuideSection {
        title: "Available Validators",
        icon: IconKind::CheckCircle,
        example: None,
        items: &[
            ("notNull", "Field cannot be null"),
            ("notEmpty", "Field cannot be empty string"),
            ("isNumeric", "Field must be numeric"),
            ("rangeCheck", "Value within range (params: min, max)"),
            ("regex", "Match pattern (params: pattern)"),
            ("inList", "Value in allowed list (params: values[])"),
            ("email", "Valid email format"),
        ],
        variant: BadgeVariant::Outline,
    },
    GuideSection {
        title: "Transformation Types",
        icon: IconKind::Settings,
        example: None,
        items: &[
            ("validate_fields", "Validate data quality with multiple validators"),
            ("add_fields", "Add computed or constant fields (uuid, timestamp, hash, etc.)"),
            ("select_columns", "Choose specific columns to keep"),
            ("deduplicate", "Remove duplicate records based on subset of columns"),
            ("filter", "Keep only rows matching SQL WHERE conditions"),
            ("aggregate", "Group and compute statistics (sum, avg, count, min, max)"),
        ],
        variant: BadgeVariant::Default,
    },
    GuideSection {
        title: "Add Field Functions",
        icon: IconKind::Bolt,
        example: Some(
            r#"{
  "name": "record_id",
  "function": "uuid"
},
{
  "name": "policy_hash",
  "function": "hash",
  "columns": ["policy_number"],
  "algorithm": "sha256"
}"#,
        ),
        items: &[
            ("current_timestamp", ""),
            ("current_date", ""),
            ("uuid", ""),
            ("literal", ""),
            ("hash", ""),
            ("upper / lower / trim", ""),
            ("concat", ""),
            ("when", ""),
            ("year / month / day", ""),
        ],
        variant: BadgeVariant::Outline,
    },
    GuideSection {
        title: "Output Sinks",
        icon: IconKind::Download,
        example: Some(
            r#"{
  "input": "validated_data",
  "name": "parquet_output",
  "paths": ["/app/data/output/policies"],
  "format": "PARQUET",
  "saveMode": "APPEND",
  "partitionBy": ["ingestion_date"]
}"#,
        ),
        items: &[
            ("APPEND", "Add to existing data"),
            ("OVERWRITE", "Replace all existing data"),
            ("IGNORE", "Skip if exists"),
            ("ERROR", "Fail if exists (default)"),
        ],
        variant: BadgeVariant::Outline,
    },
    GuideSection {
        title: "Best Practices",
        icon: IconKind::Alert,
        example: None,
        items: &[
            ("Always validate critical fields", "Use notNull and notEmpty for required fields"),
            ("Add timestamps to track ingestion", "Use current_timestamp function"),
            ("Deduplicate before saving", "Prevents duplicate records in output"),
            ("Use partitioning for large datasets", "Improves query performance"),
            ("Set quality rules in settings", "min_valid_record_percentage: 80"),
            ("Save invalid records to separate sink", "Helps debugging and monitoring"),
        ],
        variant: BadgeVariant::Success,
    },
];

/// Collapsible guide card
#[component]
pub fn MetadataGuide() -> impl IntoView {
    view! {
        <div class="table-card guide" role="region" aria-label="Metadata creation guide">
            <div class="table-header">
                <div class="table-title-group">
                    <div class="table-title">
                        <Icon kind=IconKind::FileJson/>
                        "Metadata Creation Guide"
                    </div>
                    <p class="table-description">
                        "Tips and rules for creating valid pipeline metadata files"
                    </p>
                </div>
            </div>
            <div class="card-body">
                {GUIDE_SECTIONS.iter().map(|section| view! { <GuideItem section=section/> }).collect_view()}
            </div>
        </div>
    }
}

#[component]
fn GuideItem(section: &'static GuideSection) -> impl IntoView {
    view! {
        <details class="guide-section">
            <summary class="guide-title">
                <Icon kind=section.icon/>
                <span>{section.title}</span>
            </summary>
            <div class="guide-content">
                {section.example.map(|code| view! { <pre class="code-block">{code}</pre> })}
                <ul class="guide-items">
                    {section
                        .items
                        .iter()
                        .map(|(term, text)| {
                            view! {
                                <li>
                                    <Badge text=*term variant=section.variant/>
                                    {(!text.is_empty()).then(|| view! { <span class="guide-text">{*text}</span> })}
                                </li>
                            }
                        })
                        .collect_view()}
                </ul>
            </div>
        </details>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sections_are_unique_and_filled() {
        let titles: HashSet<_> = GUIDE_SECTIONS.iter().map(|s| s.title).collect();
        assert_eq!(titles.len(), GUIDE_SECTIONS.len());
        assert!(GUIDE_SECTIONS.iter().all(|s| !s.items.is_empty()));
    }

    #[test]
    fn test_examples_are_json_fragments() {
        for section in GUIDE_SECTIONS {
            if let Some(example) = section.example {
                assert!(example.trim_start().starts_with('{'), "{}", section.title);
            }
        }
    }
}
