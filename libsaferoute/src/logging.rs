//! Tracing setup shared by the SafeRoute tools
//!
//! Logs always go to stderr so that links and reports on stdout stay
//! pipeable. The output format and level come from `SAFEROUTE_LOG_FORMAT`
//! and `SAFEROUTE_LOG_LEVEL`; `RUST_LOG`, when set, overrides the level
//! entirely.
//!
//! ```no_run
//! use libsaferoute::logging::{LogFormat, LoggingConfig};
//!
//! // What the tools do: env vars, warn by default, debug with --verbose
//! LoggingConfig::from_env("warn", false).init();
//!
//! // Explicit settings
//! LoggingConfig::new(LogFormat::Json, "info".to_string(), false).init();
//! ```

use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// HTTP client crates that are too chatty at debug level
const QUIET_DEPENDENCIES: &[&str] = &["hyper=info", "reqwest=info", "rustls=info"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One plain line per event, no target
    Text,
    /// One JSON object per line, with file and line
    Json,
    /// Multi-line colored output for development
    Pretty,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [LogFormat::Text, LogFormat::Json, LogFormat::Pretty]
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid log format: '{}'. Valid options: text, json, pretty", s))
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct LoggingConfig {
    pub format: LogFormat,
    /// Level used when neither `RUST_LOG` nor `verbose` is set
    pub level: String,
    /// Debug output for SafeRoute itself
    pub verbose: bool,
}

impl LoggingConfig {
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
        }
    }

    /// Read `SAFEROUTE_LOG_FORMAT` (default text) and `SAFEROUTE_LOG_LEVEL`
    /// (default `default_level`); an unparseable format falls back to text
    pub fn from_env(default_level: &str, verbose: bool) -> Self {
        let format = std::env::var("SAFEROUTE_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(LogFormat::Text);
        let level = std::env::var("SAFEROUTE_LOG_LEVEL").unwrap_or_else(|_| default_level.to_string());
        Self::new(format, level, verbose)
    }

    /// Filter directives applied when `RUST_LOG` is unset
    pub fn directives(&self) -> String {
        if self.verbose {
            std::iter::once("debug")
                .chain(QUIET_DEPENDENCIES.iter().copied())
                .collect::<Vec<_>>()
                .join(",")
        } else {
            self.level.clone()
        }
    }

    /// Install the global subscriber
    ///
    /// Only the first call in a process has an effect.
    pub fn init(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directives()));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);

        let _ = match self.format {
            LogFormat::Text => builder.with_target(false).try_init(),
            LogFormat::Json => builder
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_file(true)
                .with_line_number(true)
                .try_init(),
            LogFormat::Pretty => builder.pretty().with_file(true).with_line_number(true).try_init(),
        };
    }
}

/// Environment-driven setup at warn level
pub fn init_default() {
    LoggingConfig::from_env("warn", false).init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);

        let err = "xml".parse::<LogFormat>().unwrap_err();
        assert!(err.contains("Invalid log format: 'xml'"));
    }

    #[test]
    fn test_log_format_display_roundtrip() {
        for format in [LogFormat::Text, LogFormat::Json, LogFormat::Pretty] {
            assert_eq!(format.to_string().parse::<LogFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_verbose_quiets_http_clients() {
        let config = LoggingConfig::new(LogFormat::Text, "warn".to_string(), true);
        let directives = config.directives();
        assert!(directives.starts_with("debug,"));
        assert!(directives.contains("reqwest=info"));

        let config = LoggingConfig::new(LogFormat::Text, "error".to_string(), false);
        assert_eq!(config.directives(), "error");
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var("SAFEROUTE_LOG_FORMAT", "json");
        std::env::set_var("SAFEROUTE_LOG_LEVEL", "trace");
        let config = LoggingConfig::from_env("warn", false);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "trace");

        std::env::set_var("SAFEROUTE_LOG_FORMAT", "fancy");
        std::env::remove_var("SAFEROUTE_LOG_LEVEL");
        let config = LoggingConfig::from_env("warn", true);
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.level, "warn");
        assert!(config.verbose);

        std::env::remove_var("SAFEROUTE_LOG_FORMAT");
    }
}
