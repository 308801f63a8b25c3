//! Sentinel configuration types and loading.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sentinel_engine::{HttpPageSettings, MonitorKey, MonitorSettings, DEFAULT_FRAME_NAME};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::{LogDestination, LOG_FILENAME};

pub const DEFAULT_CONFIG_PATH: &str = "sentinel.ron";
const MONITOR_KEY: &str = "grade_course_names";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minutes between scheduled checks.
    pub interval_minutes: u64,
    pub page: PageConfig,
    /// Directory holding the baseline file and the log.
    pub state_dir: PathBuf,
    pub log_destination: LogDestination,
    pub notifications: NotificationMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_minutes: 5,
            page: PageConfig::default(),
            state_dir: PathBuf::from("."),
            log_destination: LogDestination::default(),
            notifications: NotificationMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Page hosting the query control.
    pub host_url: String,
    /// Request the query control issues; its response fills the results frame.
    pub action_url: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            host_url: "http://kdjw.hnust.edu.cn/jsxsd/kscj/cjcx_query".to_string(),
            action_url: "http://kdjw.hnust.edu.cn/jsxsd/kscj/cjcx_list".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationMode {
    #[default]
    Desktop,
    Log,
}

impl Config {
    /// Loads `explicit` if given, otherwise `./sentinel.ron` when it exists,
    /// otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        let local = Path::new(DEFAULT_CONFIG_PATH);
        if local.exists() {
            return Self::load_from_file(local);
        }
        Ok(Self::default())
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Fail fast on values the monitor cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_minutes == 0 {
            return Err(ConfigError::Invalid(
                "interval_minutes must be at least 1".into(),
            ));
        }
        validate_http_url("page.host_url", &self.page.host_url)?;
        validate_http_url("page.action_url", &self.page.action_url)?;
        Ok(())
    }

    pub fn period_secs(&self) -> u64 {
        self.interval_minutes.saturating_mul(60)
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir.join(LOG_FILENAME)
    }

    pub fn monitor_key(&self) -> MonitorKey {
        MonitorKey::new(MONITOR_KEY)
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings::new(self.monitor_key())
    }

    pub fn http_page_settings(&self) -> HttpPageSettings {
        HttpPageSettings {
            host_url: self.page.host_url.clone(),
            action_url: self.page.action_url.clone(),
            frame_name: DEFAULT_FRAME_NAME.to_string(),
        }
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value)
        .map_err(|err| ConfigError::Invalid(format!("{field} {value:?}: {err}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid(format!(
            "{field} must use http or https, got {other}"
        ))),
    }
}
