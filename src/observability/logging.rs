//! Structured logging configuration.

use crate::config::LoggingSettings;
use crate::{Error, Result};
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_FILTER_ENV: &str = "ROSTER_LOG";
/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "ROSTER_LOG_FORMAT";
/// Environment variable naming a log file.
pub const LOG_FILE_ENV: &str = "ROSTER_LOG_FILE";

const DEFAULT_FILTER: &str = "roster=warn";
const VERBOSE_FILTER: &str = "roster=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(Error::InvalidInput(format!("Unknown log format: {s}"))),
        }
    }
}

/// Logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Event filter.
    pub filter: EnvFilter,
    /// Output format.
    pub format: LogFormat,
    /// Log file; stderr when `None`.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Builds the logging configuration from config settings, then applies
    /// `ROSTER_LOG`, `ROSTER_LOG_FORMAT` and `ROSTER_LOG_FILE`.
    ///
    /// `verbose` raises the default level to debug; an explicit filter from
    /// the environment or the config file still wins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the filter directive or the log
    /// format does not parse.
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Result<Self> {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        let directive = env(LOG_FILTER_ENV)
            .or_else(|| settings.and_then(|s| s.filter.clone()))
            .unwrap_or_else(|| {
                if verbose {
                    VERBOSE_FILTER.to_string()
                } else {
                    DEFAULT_FILTER.to_string()
                }
            });
        let filter = EnvFilter::try_new(&directive)
            .map_err(|e| Error::InvalidInput(format!("Invalid log filter '{directive}': {e}")))?;

        let format = env(LOG_FORMAT_ENV)
            .or_else(|| settings.and_then(|s| s.format.clone()))
            .map(|f| f.parse::<LogFormat>())
            .transpose()?
            .unwrap_or_default();

        let file = env(LOG_FILE_ENV)
            .or_else(|| settings.and_then(|s| s.file.clone()))
            .map(PathBuf::from);

        Ok(Self {
            filter,
            format,
            file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_from_settings_uses_file_values() {
        let settings = LoggingSettings {
            filter: Some("roster=trace".to_string()),
            format: Some("json".to_string()),
            file: Some("/tmp/roster.log".to_string()),
        };
        let config = LoggingConfig::from_settings(Some(&settings), false).unwrap();
        // Environment overrides are not set in the test environment.
        if std::env::var(LOG_FORMAT_ENV).is_err() {
            assert_eq!(config.format, LogFormat::Json);
        }
        if std::env::var(LOG_FILE_ENV).is_err() {
            assert_eq!(config.file, Some(PathBuf::from("/tmp/roster.log")));
        }
    }

    #[test]
    fn test_from_settings_rejects_bad_filter() {
        if std::env::var(LOG_FILTER_ENV).is_ok() {
            return;
        }
        let settings = LoggingSettings {
            filter: Some("roster=loud".to_string()),
            format: None,
            file: None,
        };
        let err = LoggingConfig::from_settings(Some(&settings), false).unwrap_err();
        assert!(matches!(&err, Error::InvalidInput(msg) if msg.contains("roster=loud")));
    }

    #[test]
    fn test_from_settings_rejects_bad_format() {
        if std::env::var(LOG_FORMAT_ENV).is_ok() {
            return;
        }
        let settings = LoggingSettings {
            filter: None,
            format: Some("xml".to_string()),
            file: None,
        };
        assert!(matches!(
            LoggingConfig::from_settings(Some(&settings), false),
            Err(Error::InvalidInput(_))
        ));
    }
}
