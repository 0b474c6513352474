//! Process settings (YAML)
//!
//! Read from `~/.config/azidentity/config.yaml` unless a path is given, then
//! overridden by `AZIDENTITY_LOG_LEVEL`.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::LogLevel;

/// Env var overriding the configured log level
pub const LOG_LEVEL_ENV: &str = "AZIDENTITY_LOG_LEVEL";

static DEFAULT_USER_AGENT: Lazy<String> =
    Lazy::new(|| format!("azidentity/{}", env!("CARGO_PKG_VERSION")));

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid AZIDENTITY_LOG_LEVEL: {0}")]
    LogLevel(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minimum level written to stderr
    pub log_level: LogLevel,
    /// User-Agent sent by the `http_request` resource
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            user_agent: DEFAULT_USER_AGENT.clone(),
        }
    }
}

impl Settings {
    /// `~/.config/azidentity/config.yaml`
    pub fn default_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        config_dir.join("azidentity").join("config.yaml")
    }

    /// Load from a file; a missing file yields the defaults
    pub fn from_file(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| SettingsError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path` or the default location, then apply env overrides
    pub fn load(path: Option<&Path>) -> SettingsResult<Self> {
        let mut settings = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::from_file(Self::default_path())?,
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Apply overrides from an env lookup
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> SettingsResult<()> {
        if let Some(level) = lookup(LOG_LEVEL_ENV).filter(|v| !v.trim().is_empty()) {
            self.log_level = level.parse().map_err(SettingsError::LogLevel)?;
        }
        Ok(())
    }

    /// `--debug` forces debug-level logging
    pub fn with_debug(mut self, debug: bool) -> Self {
        if debug {
            self.log_level = LogLevel::Debug;
        }
        self
    }
}
