//! Tracing/logging initialization.
//!
//! Configured from the environment:
//! - `RUST_LOG` selects the filter (default `info`)
//! - `CUSTOMERFLOW_LOG_FORMAT` selects `json` (default) or `pretty`

use core::str::FromStr;

use tracing_subscriber::EnvFilter;

pub const LOG_FORMAT_ENV: &str = "CUSTOMERFLOW_LOG_FORMAT";
const DEFAULT_FILTER: &str = "info";

/// Output format of the fmt subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    pub filter: String,
    pub format: LogFormat,
    /// Set when the configured format could not be parsed.
    pub format_error: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::default(),
            format_error: None,
        }
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var("RUST_LOG").ok().as_deref(),
            std::env::var(LOG_FORMAT_ENV).ok().as_deref(),
        )
    }

    /// Build a config from raw values; unknown formats fall back to JSON.
    pub fn from_values(filter: Option<&str>, format: Option<&str>) -> Self {
        let filter = filter
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_FILTER)
            .to_string();

        let (format, format_error) = match format.map(LogFormat::from_str) {
            None => (LogFormat::default(), None),
            Some(Ok(f)) => (f, None),
            Some(Err(e)) => (LogFormat::default(), Some(e)),
        };

        Self {
            filter,
            format,
            format_error,
        }
    }
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .with_target(false)
            .try_init()
            .is_ok(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .pretty()
            .with_target(false)
            .try_init()
            .is_ok(),
    };

    if installed {
        if let Some(err) = &config.format_error {
            ::tracing::warn!(%err, env = LOG_FORMAT_ENV, "falling back to JSON logs");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_info_and_json() {
        let config = ObservabilityConfig::from_values(None, None);
        assert_eq!(config, ObservabilityConfig::default());
        assert_eq!(config.filter, "info");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn reads_filter_and_format() {
        let config = ObservabilityConfig::from_values(Some("customerflow_customers=debug"), Some("Pretty"));
        assert_eq!(config.filter, "customerflow_customers=debug");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.format_error.is_none());
    }

    #[test]
    fn blank_filter_uses_default() {
        let config = ObservabilityConfig::from_values(Some("  "), None);
        assert_eq!(config.filter, "info");
    }

    #[test]
    fn unknown_format_falls_back_to_json() {
        let config = ObservabilityConfig::from_values(None, Some("xml"));
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.format_error.as_deref(), Some("unknown log format 'xml'"));
    }

    #[test]
    fn init_is_idempotent() {
        let config = ObservabilityConfig::default();
        init(&config);
        init(&config);
    }
}
