use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::broker::{self, WaitOptions};
use crate::release;
use crate::workflow;
use crate::retry::{BackoffSchedule, FailureKind, FailureMatcher, RetryPolicy, DEFAULT_BACKOFF_SECS};

pub const BROKER_URL_VAR: &str = "BDCAT_SB_BROKER_URL";
pub const BROKER_TOKEN_VAR: &str = "BDCAT_SB_BROKER_TOKEN";

/// Retry policy parameters (`[retry]` in config.toml).
///
/// Leaving both `kinds` and `status_codes` empty retries every failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Waits between attempts, in seconds, consumed in order.
    pub backoff_secs: Vec<f64>,
    /// Failure kinds that qualify for a retry: http, connection, timeout, other, any.
    pub kinds: Vec<FailureKind>,
    /// HTTP status codes that qualify (implies `http` when `kinds` is empty).
    pub status_codes: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            backoff_secs: DEFAULT_BACKOFF_SECS.iter().map(|&s| s as f64).collect(),
            kinds: Vec::new(),
            status_codes: Vec::new(),
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> Result<RetryPolicy> {
        let schedule = BackoffSchedule::from_secs_f64(&self.backoff_secs)
            .context("invalid [retry] backoff_secs")?;
        let matcher = FailureMatcher::new(
            self.kinds.iter().copied(),
            self.status_codes.iter().copied(),
        );
        Ok(RetryPolicy::new(schedule, matcher))
    }
}

/// QA broker endpoint and polling (`[broker]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub url: String,
    /// Give up on a test run after this many seconds.
    pub timeout_secs: u64,
    /// Seconds between task state checks.
    pub poll_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: broker::DEFAULT_BROKER_URL.to_string(),
            timeout_secs: broker::DEFAULT_WAIT_TIMEOUT.as_secs(),
            poll_secs: broker::DEFAULT_POLL_INTERVAL.as_secs(),
        }
    }
}

impl BrokerConfig {
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            poll_interval: Duration::from_secs(self.poll_secs),
        }
    }
}

/// Data-commons deployments compared by `version-check` (`[release]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    pub production_url: String,
    pub staging_url: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            production_url: release::DEFAULT_PRODUCTION_URL.to_string(),
            staging_url: release::DEFAULT_STAGING_URL.to_string(),
        }
    }
}

/// Workflow platform checked by `submission-check` (`[workflow]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub url: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            url: workflow::DEFAULT_WORKFLOW_URL.to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/bdit/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BditConfig {
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub broker: BrokerConfig,
    #[serde(default)]
    pub release: ReleaseConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

impl BditConfig {
    /// Apply environment overrides (currently the broker URL).
    pub fn with_env_overrides(self) -> Self {
        let url = env::var(BROKER_URL_VAR).ok();
        self.with_broker_url(url.as_deref())
    }

    /// Blank or missing values keep the configured URL.
    fn with_broker_url(mut self, url: Option<&str>) -> Self {
        if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
            self.broker.url = url.to_string();
        }
        self
    }
}

/// Broker bearer token; only ever read from the environment.
pub fn broker_token() -> Option<String> {
    token_from(env::var(BROKER_TOKEN_VAR).ok().as_deref())
}

fn token_from(value: Option<&str>) -> Option<String> {
    value.filter(|t| !t.is_empty()).map(str::to_string)
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("bdit")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BditConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> Result<BditConfig> {
    if !path.exists() {
        let default_cfg = BditConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: BditConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
