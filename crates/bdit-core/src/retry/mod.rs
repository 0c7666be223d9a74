//! Retry and backoff policy.
//!
//! Wraps fallible network calls: on a qualifying failure the call is retried
//! after the next wait from a fixed backoff schedule; anything else (or an
//! exhausted schedule) hands the original error straight back to the caller.

mod classify;
mod policy;
mod run;
mod schedule;

pub use classify::{classify_curl_error, classify_io_error, Classify};
pub use policy::{Failure, FailureKind, FailureMatcher, RetryPolicy};
pub use run::{run_with_retry, run_with_retry_using, Sleeper, ThreadSleeper};
pub use schedule::{BackoffSchedule, ScheduleError, DEFAULT_BACKOFF_SECS};
