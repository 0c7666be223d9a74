//! Broker wire types and test-run id generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Broker-side environment names for BDCat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SbEnv {
    Staging,
    Production,
}

impl SbEnv {
    /// Short name used in task ids.
    pub fn name(self) -> &'static str {
        match self {
            SbEnv::Staging => "staging",
            SbEnv::Production => "production",
        }
    }

    /// Internal environment id the broker expects.
    pub fn broker_id(self) -> &'static str {
        match self {
            SbEnv::Staging => "f4c-staging-vayu",
            SbEnv::Production => "ffc",
        }
    }
}

impl fmt::Display for SbEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SbEnv {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "staging" => Ok(SbEnv::Staging),
            "production" | "prod" => Ok(SbEnv::Production),
            other => Err(format!("unknown environment {:?} (staging|production)", other)),
        }
    }
}

/// Body of `PUT /tasks/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub environment: String,
    pub test_plan_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_ids: Option<Vec<String>>,
}

impl NewTask {
    pub fn new(env: SbEnv, test_plan: &str, subset: Option<Vec<String>>) -> Self {
        Self {
            environment: env.broker_id().to_string(),
            test_plan_id: test_plan.to_string(),
            test_ids: subset,
        }
    }

    fn is_subset(&self) -> bool {
        self.test_ids.as_ref().is_some_and(|ids| !ids.is_empty())
    }
}

/// Task state as reported by the broker (Celery state names).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub state: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Task {
    /// SUCCESS, FAILURE and REVOKED are final.
    pub fn is_ready(&self) -> bool {
        matches!(self.state.as_str(), "SUCCESS" | "FAILURE" | "REVOKED")
    }

    pub fn succeeded(&self) -> bool {
        self.state == "SUCCESS"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Report {
    #[serde(default)]
    pub results: Vec<TestResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestResult {
    pub id: String,
    pub state: String,
}

impl TestResult {
    pub fn passed(&self) -> bool {
        matches!(self.state.as_str(), "PASSED" | "SKIPPED")
    }
}

/// Unique task id: `bdc-<env>-<plan>[-subset]-<YYYYmmdd-HHMMSS>-<abc>`.
///
/// The three distinct random letters keep runs started in the same second apart.
pub fn new_task_id(env: SbEnv, task: &NewTask, now: DateTime<Utc>, rng: &mut fastrand::Rng) -> String {
    let mut letters: Vec<char> = ('a'..='z').collect();
    rng.shuffle(&mut letters);
    let suffix: String = letters.into_iter().take(3).collect();
    format!(
        "bdc-{}-{}{}-{}-{}",
        env.name(),
        task.test_plan_id,
        if task.is_subset() { "-subset" } else { "" },
        now.format("%Y%m%d-%H%M%S"),
        suffix
    )
}
