//! Client for the QA broker that runs the partner platform's internal test
//! plans on our behalf.
//!
//! A run is started with `PUT /tasks/{id}`, polled with `GET /tasks/{id}`
//! until it reaches a final state, and judged from `GET /reports/{id}`.
//! Every HTTP call goes through the retry policy.

mod task;

pub use task::{new_task_id, NewTask, Report, SbEnv, Task, TestResult};

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::http::{HttpClient, RequestError};
use crate::retry::{run_with_retry_using, Classify, Failure, RetryPolicy, Sleeper, ThreadSleeper};

pub const DEFAULT_BROKER_URL: &str = "https://qa-broker.sbgenomics.com";
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(1800);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("test run {task_id} is {state}: {task:?}")]
    TaskFailed {
        task_id: String,
        state: String,
        task: Box<Task>,
    },

    #[error("test run {task_id} not ready after {timeout:?} (last state {last_state})")]
    Timeout {
        task_id: String,
        timeout: Duration,
        last_state: String,
    },

    #[error("test run {task_id} has {} failed test(s): {}", .failed.len(), .failed.join(", "))]
    TestsFailed { task_id: String, failed: Vec<String> },
}

impl Classify for BrokerError {
    fn failure(&self) -> Failure {
        match self {
            BrokerError::Request(e) => e.failure(),
            _ => Failure::other(),
        }
    }
}

/// How long to wait for a run and how often to look at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_WAIT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

pub struct BrokerClient {
    http: HttpClient,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper + Send + Sync>,
}

impl BrokerClient {
    pub fn new(http: HttpClient, policy: RetryPolicy) -> Self {
        Self {
            http,
            policy,
            sleeper: Arc::new(ThreadSleeper),
        }
    }

    /// Replace the sleeper used for retry backoff and polling.
    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + Send + Sync + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    pub fn report_url(&self, task_id: &str) -> String {
        self.http
            .url(&format!("/reports/{}", task_id), &[])
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("{}/reports/{}", self.http.base_url(), task_id))
    }

    /// Start a new run of `test_plan`, optionally restricted to `subset`.
    pub fn new_test_run(
        &self,
        env: SbEnv,
        test_plan: &str,
        subset: Option<Vec<String>>,
    ) -> Result<Task, BrokerError> {
        let new_task = NewTask::new(env, test_plan, subset);
        let task_id = new_task_id(env, &new_task, chrono::Utc::now(), &mut fastrand::Rng::new());
        let path = format!("/tasks/{}", task_id);
        let body = serde_json::to_value(&new_task).map_err(|source| RequestError::Encode {
            method: "PUT".into(),
            url: path.clone(),
            source,
        })?;
        tracing::info!("starting a new test run of {}: {}", test_plan, task_id);

        let task = run_with_retry_using(&self.policy, &*self.sleeper, "broker: start test run", || {
            self.http
                .put_json(&path, &[("force_retries", "1")], &body)?
                .expect_status(201)?
                .json::<Task>()
        })?;
        Ok(task)
    }

    pub fn fetch_task(&self, task_id: &str) -> Result<Task, BrokerError> {
        let path = format!("/tasks/{}", task_id);
        let task = run_with_retry_using(&self.policy, &*self.sleeper, "broker: refresh task", || {
            self.http.get(&path)?.expect_status(200)?.json::<Task>()
        })?;
        Ok(task)
    }

    /// Poll until the run reaches SUCCESS, FAILURE or REVOKED.
    ///
    /// Only SUCCESS is `Ok`; the other final states and running past
    /// `opts.timeout` are errors.
    pub fn wait_until_done(&self, task: &Task, opts: WaitOptions) -> Result<Task, BrokerError> {
        let task_id = task.id.clone();
        let mut last_state = task.state.clone();
        let start = Instant::now();
        tracing::info!("waiting for test run {} to complete", task_id);

        while start.elapsed() < opts.timeout {
            let current = self.fetch_task(&task_id)?;
            tracing::info!("test run {} is {}", task_id, current.state);

            if current.is_ready() {
                if current.succeeded() {
                    tracing::info!("test run report: {}", self.report_url(&task_id));
                    return Ok(current);
                }
                return Err(BrokerError::TaskFailed {
                    task_id,
                    state: current.state.clone(),
                    task: Box::new(current),
                });
            }
            last_state = current.state;
            self.sleeper.sleep(opts.poll_interval);
        }

        Err(BrokerError::Timeout {
            task_id,
            timeout: opts.timeout,
            last_state,
        })
    }

    /// Fetch the run's report; every result must be PASSED or SKIPPED.
    pub fn assert_all_tests_passed(&self, task: &Task) -> Result<Report, BrokerError> {
        let path = format!("/reports/{}", task.id);
        let report = run_with_retry_using(&self.policy, &*self.sleeper, "broker: fetch report", || {
            self.http.get(&path)?.expect_status(200)?.json::<Report>()
        })?;

        let failed: Vec<String> = report
            .results
            .iter()
            .filter(|r| !r.passed())
            .map(|r| {
                tracing::info!("[{}] failed test: {}", task.id, r.id);
                r.id.clone()
            })
            .collect();
        if !failed.is_empty() {
            return Err(BrokerError::TestsFailed {
                task_id: task.id.clone(),
                failed,
            });
        }
        Ok(report)
    }

    /// Start, wait for, and check a full run.
    pub fn execute(
        &self,
        env: SbEnv,
        test_plan: &str,
        subset: Option<Vec<String>>,
        opts: WaitOptions,
    ) -> Result<Report, BrokerError> {
        let task = self.new_test_run(env, test_plan, subset)?;
        let task = self.wait_until_done(&task, opts)?;
        self.assert_all_tests_passed(&task)
    }
}
