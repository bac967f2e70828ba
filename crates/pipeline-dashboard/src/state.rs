//! View-state helpers shared by the pages
//!
//! Everything here is pure: client-side search, display formatting, export
//! serialization and route building. Pages own their fetched data; these
//! functions only derive from it.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::types::{MetadataFile, PipelineLog, PipelineRun, RunStatus};

// ============================================================================
// Search
// ============================================================================

/// Case-insensitive substring match. An empty query matches everything.
pub fn matches_query(haystack: &str, query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || haystack.to_lowercase().contains(&query.to_lowercase())
}

/// Runs whose id or metadata name contains `query`, optionally restricted to
/// one status. Backend order is preserved.
pub fn filter_runs(runs: &[PipelineRun], query: &str, status: Option<RunStatus>) -> Vec<PipelineRun> {
    runs.iter()
        .filter(|run| status.map_or(true, |s| run.status == s))
        .filter(|run| matches_query(&run.pipeline_id, query) || matches_query(&run.metadata_name, query))
        .cloned()
        .collect()
}

/// Metadata files whose name contains `query`
pub fn filter_metadata(files: &[MetadataFile], query: &str) -> Vec<MetadataFile> {
    files
        .iter()
        .filter(|file| matches_query(&file.name, query))
        .cloned()
        .collect()
}

/// Log entries whose message, level or stage contains `query`
pub fn filter_logs(logs: &[PipelineLog], query: &str) -> Vec<PipelineLog> {
    logs.iter()
        .filter(|log| {
            matches_query(&log.message, query)
                || matches_query(&log.level, query)
                || log.stage.as_deref().is_some_and(|s| matches_query(s, query))
        })
        .cloned()
        .collect()
}

// ============================================================================
// Export
// ============================================================================

/// `[timestamp] [level] [stage] message`, without the stage bracket when the
/// entry has no stage
pub fn format_log_line(log: &PipelineLog) -> String {
    match log.stage.as_deref().filter(|s| !s.is_empty()) {
        Some(stage) => format!("[{}] [{}] [{}] {}", log.timestamp, log.level, stage, log.message),
        None => format!("[{}] [{}] {}", log.timestamp, log.level, log.message),
    }
}

/// Plain-text export of the given entries, one line each
pub fn export_logs(logs: &[PipelineLog]) -> String {
    logs.iter().map(format_log_line).collect::<Vec<_>>().join("\n")
}

/// File name of a log export
pub fn log_file_name(pipeline_id: &str) -> String {
    format!("pipeline-{}-logs.txt", pipeline_id)
}

/// File name of a metadata export, `.json` ensured
pub fn metadata_file_name(name: &str) -> String {
    if name.to_lowercase().ends_with(".json") {
        name.to_string()
    } else {
        format!("{}.json", name)
    }
}

/// Pretty-printed JSON for downloads and the document viewer
pub fn pretty_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

// ============================================================================
// Input Parsing
// ============================================================================

/// Optional execution parameters typed by the user. Blank input means none;
/// anything else must be a JSON object.
pub fn parse_parameters(input: &str) -> Result<Option<Map<String, Value>>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str::<Value>(input) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        _ => Err("Parameters must be a valid JSON object".to_string()),
    }
}

// ============================================================================
// Routes
// ============================================================================

/// Logs page for one run
pub fn logs_route(pipeline_id: &str) -> String {
    format!("/logs?id={}", urlencoding::encode(pipeline_id))
}

// ============================================================================
// Formatting
// ============================================================================

/// Format a number with K/M suffix
pub fn format_number(num: u64) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

/// Percentage with one decimal
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Clamp a percentage for use as a CSS width
pub fn bar_width(percentage: f64) -> f64 {
    if percentage.is_finite() {
        percentage.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Parse RFC 3339 or a naive ISO-8601 timestamp (assumed UTC)
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Display form of a backend timestamp; unparseable input is shown as-is
pub fn format_timestamp(value: &str) -> String {
    match parse_timestamp(value) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None if value.is_empty() => "-".to_string(),
        None => value.to_string(),
    }
}

/// Date-only display form
pub fn format_date(value: &str) -> String {
    match parse_timestamp(value) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None if value.is_empty() => "-".to_string(),
        None => value.to_string(),
    }
}

/// Elapsed seconds as `1h 2m`, `3m 4s` or `5s`
pub fn format_seconds(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.round() as u64
    } else {
        0
    };

    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Duration column of a run
pub fn run_duration(run: &PipelineRun) -> String {
    if let Some(seconds) = run.duration_seconds {
        return format_seconds(seconds);
    }

    let Some(end) = run.end_time.as_deref() else {
        return "In progress".to_string();
    };

    match (parse_timestamp(&run.start_time), parse_timestamp(end)) {
        (Some(start), Some(end)) => {
            format_seconds((end - start).num_milliseconds() as f64 / 1000.0)
        }
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(id: &str, metadata: &str, status: RunStatus) -> PipelineRun {
        PipelineRun {
            pipeline_id: id.to_string(),
            metadata_name: metadata.to_string(),
            status,
            start_time: "2024-01-15T10:30:00Z".to_string(),
            ..Default::default()
        }
    }

    fn log(level: &str, stage: Option<&str>, message: &str) -> PipelineLog {
        PipelineLog {
            timestamp: "2024-01-15T10:00:00Z".to_string(),
            level: level.to_string(),
            stage: stage.map(str::to_string),
            message: message.to_string(),
            details: None,
        }
    }

    fn sample_runs() -> Vec<PipelineRun> {
        vec![
            run("pip-2024-001", "motor_insurance_config_v2.json", RunStatus::Running),
            run("pip-2024-002", "claims_processing_v1.json", RunStatus::Success),
            run("pip-2023-117", "premium_2024-001_calc.json", RunStatus::Failed),
            run("pip-2023-118", "risk_assessment_v2.json", RunStatus::Success),
        ]
    }

    #[test]
    fn test_filter_runs_by_id_or_metadata() {
        let runs = sample_runs();
        let filtered = filter_runs(&runs, "2024-001", None);
        let ids: Vec<_> = filtered.iter().map(|r| r.pipeline_id.as_str()).collect();
        assert_eq!(ids, vec!["pip-2024-001", "pip-2023-117"]);
    }

    #[test]
    fn test_filter_runs_case_insensitive_and_idempotent() {
        let runs = sample_runs();
        let once = filter_runs(&runs, "CLAIMS", None);
        assert_eq!(once.len(), 1);
        let twice = filter_runs(&once, "CLAIMS", None);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_runs_empty_query_keeps_order() {
        let runs = sample_runs();
        assert_eq!(filter_runs(&runs, "  ", None), runs);
    }

    #[test]
    fn test_filter_runs_by_status() {
        let runs = sample_runs();
        let filtered = filter_runs(&runs, "", Some(RunStatus::Success));
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.status == RunStatus::Success));
    }

    #[test]
    fn test_filter_metadata() {
        let files = vec![
            MetadataFile {
                name: "Motor_Config.json".to_string(),
                version: Some("2.0".to_string()),
                description: None,
                created_at: String::new(),
                updated_at: String::new(),
                is_active: true,
            },
            MetadataFile {
                name: "claims.json".to_string(),
                version: None,
                description: None,
                created_at: String::new(),
                updated_at: String::new(),
                is_active: false,
            },
        ];
        let filtered = filter_metadata(&files, "motor");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Motor_Config.json");
    }

    #[test]
    fn test_filter_logs_matches_level_and_stage() {
        let logs = vec![
            log("INFO", Some("extract"), "Reading sources"),
            log("ERROR", None, "Sink unavailable"),
            log("INFO", Some("validate_fields"), "3 invalid rows"),
        ];
        assert_eq!(filter_logs(&logs, "error").len(), 1);
        assert_eq!(filter_logs(&logs, "VALIDATE").len(), 1);
        assert_eq!(filter_logs(&logs, "rows")[0].message, "3 invalid rows");
        assert_eq!(filter_logs(&logs, "").len(), 3);
    }

    #[test]
    fn test_export_logs_matches_filtered_lines() {
        let logs = vec![
            log("INFO", Some("extract"), "Reading sources"),
            log("ERROR", None, "Sink unavailable"),
        ];
        let filtered = filter_logs(&logs, "");
        let exported = export_logs(&filtered);
        let lines: Vec<_> = exported.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[2024-01-15T10:00:00Z] [INFO] [extract] Reading sources",
                "[2024-01-15T10:00:00Z] [ERROR] Sink unavailable",
            ]
        );
        assert_eq!(export_logs(&[]), "");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(log_file_name("pip-123"), "pipeline-pip-123-logs.txt");
        assert_eq!(metadata_file_name("a.json"), "a.json");
        assert_eq!(metadata_file_name("motor"), "motor.json");
    }

    #[test]
    fn test_parse_parameters() {
        assert_eq!(parse_parameters("  "), Ok(None));
        let params = parse_parameters(r#"{"batch_size": 1000}"#).unwrap().unwrap();
        assert_eq!(params.get("batch_size"), Some(&Value::from(1000)));
        assert!(parse_parameters("[1, 2]").is_err());
        assert!(parse_parameters("{oops").is_err());
    }

    #[test]
    fn test_logs_route() {
        assert_eq!(logs_route("pip-123"), "/logs?id=pip-123");
        assert_eq!(logs_route("a b"), "/logs?id=a%20b");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_500), "1.5K");
        assert_eq!(format_number(2_000_000), "2.0M");
    }

    #[test]
    fn test_format_percentage_and_bar_width() {
        assert_eq!(format_percentage(87.26), "87.3%");
        assert_eq!(bar_width(140.0), 100.0);
        assert_eq!(bar_width(-3.0), 0.0);
        assert_eq!(bar_width(f64::NAN), 0.0);
    }

    #[test]
    fn test_timestamps() {
        assert_eq!(format_timestamp("2024-01-15T10:30:00Z"), "2024-01-15 10:30:00");
        assert_eq!(format_timestamp("2024-01-15T10:30:00.123456"), "2024-01-15 10:30:00");
        assert_eq!(format_timestamp("2024-01-15T12:30:00+02:00"), "2024-01-15 10:30:00");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
        assert_eq!(format_timestamp(""), "-");
        assert_eq!(format_date("2024-01-10T14:30:00Z"), "2024-01-10");
    }

    #[test]
    fn test_run_duration() {
        let mut r = run("pip-1", "a.json", RunStatus::Running);
        assert_eq!(run_duration(&r), "In progress");

        r.end_time = Some("2024-01-15T10:33:30Z".to_string());
        assert_eq!(run_duration(&r), "3m 30s");

        r.duration_seconds = Some(7260.0);
        assert_eq!(run_duration(&r), "2h 1m");

        r.duration_seconds = None;
        r.end_time = Some("garbage".to_string());
        assert_eq!(run_duration(&r), "-");
    }
}
