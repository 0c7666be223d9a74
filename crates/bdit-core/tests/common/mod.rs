#![allow(dead_code)]

pub mod json_server;

use bdit_core::retry::{BackoffSchedule, FailureMatcher, RetryPolicy, Sleeper};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Policy with `retries` zero-length waits, so tests never actually sleep.
pub fn instant_policy(retries: usize, matcher: FailureMatcher) -> RetryPolicy {
    RetryPolicy::new(BackoffSchedule::new(vec![Duration::ZERO; retries]), matcher)
}

/// Records requested waits instead of sleeping.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    pub waits: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, wait: Duration) {
        self.waits.lock().unwrap().push(wait);
    }
}
