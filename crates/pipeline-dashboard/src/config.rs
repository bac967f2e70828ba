//! Dashboard configuration
//!
//! The backend base URL is resolved once at startup and injected into the
//! [`ApiClient`](crate::api::ApiClient); nothing reads it from a global after
//! that. The server can inject config via `<meta>` tags in the HTML:
//!
//! ```html
//! <meta name="pipeline:api-url" content="http://pipelines.local:8000">
//! <meta name="pipeline:version" content="1.0">
//! <meta name="pipeline:log-level" content="debug">
//! ```
//!
//! or via `window.__PIPELINE_CONFIG__ = { api_url: "..." }`. When neither is
//! present the build-time `PIPELINE_API_BASE_URL` environment variable is
//! used, and finally [`DEFAULT_API_URL`].

use std::time::Duration;

use wasm_bindgen::JsCast;

/// Backend address used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

const META_API_URL: &str = "pipeline:api-url";
const META_VERSION: &str = "pipeline:version";
const META_LOG_LEVEL: &str = "pipeline:log-level";
const JS_CONFIG_OBJECT: &str = "__PIPELINE_CONFIG__";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("API URL is empty")]
    EmptyApiUrl,

    #[error("API URL must start with http:// or https://: {0}")]
    UnsupportedScheme(String),
}

/// Per-page refresh intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    pub dashboard: Duration,
    pub runs: Duration,
    pub metadata: Duration,
    pub logs: Duration,
    pub health: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            dashboard: Duration::from_secs(5),
            runs: Duration::from_secs(5),
            metadata: Duration::from_secs(10),
            logs: Duration::from_secs(5),
            health: Duration::from_secs(10),
        }
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// API base URL without trailing slash (e.g. "http://localhost:8000")
    pub api_url: String,
    /// Version label shown in the sidebar
    pub version: Option<String>,
    /// Maximum level forwarded to the browser console
    pub log_level: tracing::Level,
    pub poll: PollIntervals,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            version: None,
            log_level: tracing::Level::INFO,
            poll: PollIntervals::default(),
        }
    }
}

impl DashboardConfig {
    /// Configuration pointing at the given backend
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: normalize_url(&api_url.into()),
            ..Self::default()
        }
    }

    /// Load configuration from various sources (priority order):
    /// 1. `<meta name="pipeline:api-url">` tag (server-injected)
    /// 2. `window.__PIPELINE_CONFIG__.api_url` (JavaScript injection)
    /// 3. `PIPELINE_API_BASE_URL` at build time
    /// 4. [`DEFAULT_API_URL`]
    pub fn load() -> Self {
        let mut config = Self::default();
        let mut api_url = None;

        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            api_url = get_meta_content(&document, META_API_URL).filter(|s| !s.trim().is_empty());

            if let Some(version) = get_meta_content(&document, META_VERSION) {
                if !version.is_empty() {
                    config.version = Some(version);
                }
            }

            if let Some(level) = get_meta_content(&document, META_LOG_LEVEL) {
                config.log_level = parse_log_level(&level).unwrap_or(config.log_level);
            }
        }

        let js_url = if api_url.is_none() {
            get_js_config("api_url")
        } else {
            None
        };

        config.api_url = resolve_api_url(api_url, js_url, option_env!("PIPELINE_API_BASE_URL"));
        config
    }

    /// Get the API base URL
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Reject URLs the browser `fetch` cannot reach
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::UnsupportedScheme(self.api_url.clone()));
        }
        Ok(())
    }
}

/// First non-blank of the meta tag, the JS object and the build-time value,
/// else [`DEFAULT_API_URL`]
pub fn resolve_api_url(meta: Option<String>, js: Option<String>, build: Option<&str>) -> String {
    let url = meta
        .into_iter()
        .chain(js)
        .chain(build.map(str::to_string))
        .find(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    normalize_url(&url)
}

/// Trim whitespace and trailing slashes so paths can be appended verbatim
pub fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Parse a level name as written in the meta tag
pub fn parse_log_level(value: &str) -> Option<tracing::Level> {
    match value.trim().to_ascii_lowercase().as_str() {
        "trace" => Some(tracing::Level::TRACE),
        "debug" => Some(tracing::Level::DEBUG),
        "info" => Some(tracing::Level::INFO),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "error" => Some(tracing::Level::ERROR),
        _ => None,
    }
}

/// Get content from a <meta name="..."> tag
fn get_meta_content(document: &web_sys::Document, name: &str) -> Option<String> {
    let selector = format!("meta[name=\"{}\"]", name);
    document
        .query_selector(&selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<web_sys::HtmlMetaElement>().ok())
        .map(|meta| meta.content())
}

/// Get a value from window.__PIPELINE_CONFIG__
fn get_js_config(key: &str) -> Option<String> {
    let window = web_sys::window()?;
    let config = js_sys::Reflect::get(&window, &JS_CONFIG_OBJECT.into()).ok()?;

    if config.is_undefined() || config.is_null() {
        return None;
    }

    let value = js_sys::Reflect::get(&config, &key.into()).ok()?;
    value.as_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert!(config.version.is_none());
        assert_eq!(config.log_level, tracing::Level::INFO);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_trailing_slashes_trimmed() {
        let config = DashboardConfig::with_api_url(" http://pipelines.local:8000// ");
        assert_eq!(config.api_url(), "http://pipelines.local:8000");
    }

    #[test]
    fn test_resolve_api_url_priority() {
        let meta = || Some("http://meta:8000/".to_string());
        let js = || Some("http://js:8000".to_string());

        assert_eq!(resolve_api_url(meta(), js(), Some("http://build:8000")), "http://meta:8000");
        assert_eq!(resolve_api_url(None, js(), Some("http://build:8000")), "http://js:8000");
        assert_eq!(resolve_api_url(None, None, Some("http://build:8000")), "http://build:8000");
        assert_eq!(resolve_api_url(None, None, None), DEFAULT_API_URL);
    }

    #[test]
    fn test_resolve_api_url_skips_blank_values() {
        // An empty meta tag in the shipped index.html must not shadow the build value
        assert_eq!(
            resolve_api_url(Some(String::new()), Some("  ".to_string()), Some("http://build:8000")),
            "http://build:8000"
        );
        assert_eq!(resolve_api_url(Some(String::new()), None, Some("")), DEFAULT_API_URL);
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        assert_eq!(
            DashboardConfig::with_api_url("").validate(),
            Err(ConfigError::EmptyApiUrl)
        );
        assert!(matches!(
            DashboardConfig::with_api_url("ftp://host").validate(),
            Err(ConfigError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_poll_interval_defaults() {
        let poll = PollIntervals::default();
        assert_eq!(poll.dashboard, Duration::from_secs(5));
        assert_eq!(poll.metadata, Duration::from_secs(10));
        assert_eq!(poll.health, Duration::from_secs(10));
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG"), Some(tracing::Level::DEBUG));
        assert_eq!(parse_log_level("warning"), Some(tracing::Level::WARN));
        assert_eq!(parse_log_level("loud"), None);
    }
}
