//! Watcher configuration.
//!
//! Resolution order: built-in defaults, then `~/.openclaw/statuswatch.yaml`
//! if it exists, then `STATUSWATCH_*` environment variables.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_STATUS_URL: &str = "https://status.openai.com/api/v2/summary.json";
pub const DEFAULT_INITIAL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_MIN_INTERVAL_SECS: u64 = 20;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub status_url: String,
    /// Interval used until the first real change is seen.
    pub initial_interval: Duration,
    /// Floor for the adaptive interval.
    pub min_interval: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Emit events for everything active on the first successful fetch.
    /// When false the first payload only establishes a silent baseline.
    pub announce_baseline: bool,
    /// Incident statuses that are no longer reportable.
    pub terminal_statuses: Vec<String>,
    /// Component status that means "nothing to report".
    pub nominal_component_status: String,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            status_url: DEFAULT_STATUS_URL.to_string(),
            initial_interval: Duration::from_secs(DEFAULT_INITIAL_INTERVAL_SECS),
            min_interval: Duration::from_secs(DEFAULT_MIN_INTERVAL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: format!("statuswatch/{}", env!("CARGO_PKG_VERSION")),
            announce_baseline: true,
            terminal_statuses: vec!["resolved".into(), "postmortem".into()],
            nominal_component_status: "operational".into(),
        }
    }
}

/// On-disk shape. Every field is optional so a file can override just one.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    status_url: Option<String>,
    interval_secs: Option<u64>,
    min_interval_secs: Option<u64>,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
    announce_baseline: Option<bool>,
    terminal_statuses: Option<Vec<String>>,
    nominal_component_status: Option<String>,
}

impl WatcherConfig {
    /// Load from the default file location and the process environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = default_config_path() {
            if path.exists() {
                config.merge_file(&path)?;
            }
        }

        config.merge_env(|var| std::env::var(var).ok())?;
        config.finalize()?;
        Ok(config)
    }

    /// Overlay values from a YAML file.
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        if raw.trim().is_empty() {
            return Ok(());
        }
        let file: ConfigFile = serde_yaml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        if let Some(url) = file.status_url {
            self.status_url = url;
        }
        if let Some(secs) = file.interval_secs {
            self.initial_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = file.min_interval_secs {
            self.min_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = file.timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(ua) = file.user_agent {
            self.user_agent = ua;
        }
        if let Some(announce) = file.announce_baseline {
            self.announce_baseline = announce;
        }
        if let Some(statuses) = file.terminal_statuses {
            self.terminal_statuses = statuses;
        }
        if let Some(status) = file.nominal_component_status {
            self.nominal_component_status = status;
        }
        Ok(())
    }

    /// Overlay `STATUSWATCH_*` variables. `lookup` is injectable for tests.
    pub fn merge_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("STATUSWATCH_URL") {
            self.status_url = url;
        }
        if let Some(secs) = parse_secs(&lookup, "STATUSWATCH_INTERVAL_SECS")? {
            self.initial_interval = secs;
        }
        if let Some(secs) = parse_secs(&lookup, "STATUSWATCH_MIN_INTERVAL_SECS")? {
            self.min_interval = secs;
        }
        if let Some(secs) = parse_secs(&lookup, "STATUSWATCH_TIMEOUT_SECS")? {
            self.request_timeout = secs;
        }
        if let Some(value) = lookup("STATUSWATCH_ANNOUNCE_BASELINE") {
            self.announce_baseline = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: "STATUSWATCH_ANNOUNCE_BASELINE",
                        value,
                    })
                }
            };
        }
        Ok(())
    }

    /// Validate and clamp. The initial interval never starts below the floor.
    pub fn finalize(&mut self) -> Result<(), ConfigError> {
        if self.status_url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl);
        }
        if self.min_interval.is_zero() {
            return Err(ConfigError::ZeroDuration { field: "min_interval" });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration { field: "request_timeout" });
        }
        if self.initial_interval < self.min_interval {
            self.initial_interval = self.min_interval;
        }
        Ok(())
    }
}

fn parse_secs<F>(lookup: &F, var: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
    }
}

/// `~/.openclaw/statuswatch.yaml`, next to the other OpenClaw daemons' state.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".openclaw").join("statuswatch.yaml"))
}
