//! Configuration management.

use crate::io::ImportMode;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming a config file.
pub const CONFIG_PATH_ENV: &str = "ROSTER_CONFIG_PATH";

/// Environment variable overriding the store path.
pub const STORE_PATH_ENV: &str = "ROSTER_STORE_PATH";

/// Main configuration for roster.
#[derive(Debug, Clone)]
pub struct RosterConfig {
    /// Path of the roster file.
    pub store_path: PathBuf,
    /// Import defaults.
    pub import: ImportSettings,
    /// Logging settings from the config file.
    pub logging: Option<LoggingSettings>,
}

/// Import defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSettings {
    /// Mode used when the command line does not name one.
    pub mode: ImportMode,
    /// Drop incoming anniversaries the matched person already has. Defaults
    /// to `true`; `false` keeps every incoming anniversary on merge.
    pub dedup_merged_anniversaries: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            mode: ImportMode::Append,
            dedup_merged_anniversaries: true,
        }
    }
}

/// Logging section in config file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, e.g. `roster=debug`.
    pub filter: Option<String>,
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Log file path; logs go to stderr when unset.
    pub file: Option<String>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Roster file path.
    pub store_path: Option<String>,
    /// Import section.
    pub import: Option<ConfigFileImport>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
}

/// Import section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileImport {
    /// Default import mode.
    pub mode: Option<ImportMode>,
    /// Drop duplicate anniversaries on merge.
    pub dedup_merged_anniversaries: Option<bool>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            import: ImportSettings::default(),
            logging: None,
        }
    }
}

impl RosterConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;

        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config file.
    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks `<platform config dir>/roster/config.toml`. Returns default
    /// configuration if no config file is found or it fails to load.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let platform_config = base_dirs.config_dir().join("roster").join("config.toml");
        if platform_config.exists() {
            match Self::load_from_file(&platform_config) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(
                    path = %platform_config.display(),
                    error = %e,
                    "Ignoring unreadable config file"
                ),
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `RosterConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(store_path) = file.store_path {
            config.store_path = PathBuf::from(store_path);
        }
        if let Some(import) = file.import {
            if let Some(mode) = import.mode {
                config.import.mode = mode;
            }
            if let Some(v) = import.dedup_merged_anniversaries {
                config.import.dedup_merged_anniversaries = v;
            }
        }
        config.logging = file.logging;

        config
    }

    /// Applies `ROSTER_STORE_PATH` if set.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        match std::env::var(STORE_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => self.with_store_path(path),
            _ => self,
        }
    }

    /// Sets the roster file path.
    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }
}

/// Returns `<platform data dir>/roster/roster.json`, or `roster.json` in the
/// working directory when no home directory is known.
#[must_use]
pub fn default_store_path() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from("roster.json"),
        |dirs| dirs.data_dir().join("roster").join("roster.json"),
    )
}
