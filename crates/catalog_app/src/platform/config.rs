use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use catalog_core::CatalogProfile;
use catalog_engine::GatewaySettings;
use catalog_logging::LogDestination;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = "catalog.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid configuration in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("unknown list '{0}' (expected 'jobs' or 'companies')")]
    UnknownList(String),
    #[error("unknown log destination '{0}' (expected 'file', 'terminal' or 'both')")]
    UnknownLogDestination(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListChoice {
    Jobs,
    Companies,
}

impl ListChoice {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "jobs" => Ok(ListChoice::Jobs),
            "companies" => Ok(ListChoice::Companies),
            _ => Err(ConfigError::UnknownList(raw.to_string())),
        }
    }
}

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogChoice {
    File,
    Terminal,
    Both,
}

impl LogChoice {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(LogChoice::File),
            "terminal" => Ok(LogChoice::Terminal),
            "both" => Ok(LogChoice::Both),
            _ => Err(ConfigError::UnknownLogDestination(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub list: ListChoice,
    /// Directory for file-backed session snapshots; in-memory when unset.
    pub session_dir: Option<PathBuf>,
    pub log_file: PathBuf,
    pub log_to: LogChoice,
    pub request_timeout_secs: u64,
    /// Overrides of the list's debounce delay, in milliseconds.
    pub debounce_ms: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".to_string(),
            api_key: None,
            list: ListChoice::Jobs,
            session_dir: None,
            log_file: PathBuf::from("catalog.log"),
            log_to: LogChoice::File,
            request_timeout_secs: 30,
            debounce_ms: None,
        }
    }
}

impl AppConfig {
    /// Reads `CATALOG_CONFIG` (or `./catalog.ron`) and applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let lookup = |name: &str| std::env::var(name).ok();
        let path = lookup("CATALOG_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::from_file(&path)?.with_overrides(lookup)
    }

    /// A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup("CATALOG_API_URL") {
            self.api_url = url;
        }
        if let Some(key) = lookup("CATALOG_API_KEY") {
            self.api_key = Some(key).filter(|key| !key.is_empty());
        }
        if let Some(list) = lookup("CATALOG_LIST") {
            self.list = ListChoice::parse(&list)?;
        }
        if let Some(dir) = lookup("CATALOG_SESSION_DIR") {
            self.session_dir = Some(PathBuf::from(dir)).filter(|dir| !dir.as_os_str().is_empty());
        }
        if let Some(destination) = lookup("CATALOG_LOG") {
            self.log_to = LogChoice::parse(&destination)?;
        }
        Ok(self)
    }

    pub fn log_destination(&self) -> LogDestination {
        match self.log_to {
            LogChoice::File => LogDestination::File,
            LogChoice::Terminal => LogDestination::Terminal,
            LogChoice::Both => LogDestination::Both,
        }
    }

    pub fn profile(&self) -> CatalogProfile {
        let mut profile = match self.list {
            ListChoice::Jobs => CatalogProfile::jobs(),
            ListChoice::Companies => CatalogProfile::companies(),
        };
        if let Some(ms) = self.debounce_ms {
            profile.debounce = Duration::from_millis(ms);
        }
        profile
    }

    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            base_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            ..GatewaySettings::default()
        }
    }
}
