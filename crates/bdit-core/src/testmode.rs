//! Environment-driven gating for live integration checks.

use std::env;

pub const TESTMODE_VAR: &str = "BDCAT_INTEGRATION_TESTMODE";
pub const STAGE_VAR: &str = "BDCAT_STAGE";
const DEFAULT_TESTMODE: &str = "workspace_access";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Staging,
    Production,
}

/// Which live checks the current run may perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestMode {
    pub mode: String,
    pub stage: Stage,
}

impl Default for TestMode {
    fn default() -> Self {
        Self {
            mode: DEFAULT_TESTMODE.to_string(),
            stage: Stage::default(),
        }
    }
}

impl TestMode {
    pub fn from_env() -> Self {
        Self::from_values(env::var(TESTMODE_VAR).ok().as_deref(), env::var(STAGE_VAR).ok().as_deref())
    }

    pub fn from_values(mode: Option<&str>, stage: Option<&str>) -> Self {
        let mode = mode
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_TESTMODE)
            .to_string();
        let stage = match stage.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("production") | Some("prod") => Stage::Production,
            Some("staging") | Some("") | None => Stage::Staging,
            Some(other) => {
                tracing::warn!("unknown {}={:?}, assuming staging", STAGE_VAR, other);
                Stage::Staging
            }
        };
        Self { mode, stage }
    }

    /// Controlled-access checks need extra credentials and are opt-in.
    pub fn controlled_access(&self) -> bool {
        self.mode.contains("controlled_access")
    }

    pub fn staging_only(&self) -> bool {
        self.stage == Stage::Staging
    }

    pub fn production_only(&self) -> bool {
        self.stage == Stage::Production
    }
}
