//! Retry loop: run a closure until success, a non-qualifying failure, or an
//! exhausted schedule.

use std::fmt::Display;
use std::time::Duration;

use super::classify::Classify;
use super::policy::RetryPolicy;

/// Blocks the calling thread between attempts.
pub trait Sleeper {
    fn sleep(&self, wait: Duration);
}

/// Real wall-clock sleep.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, wait: Duration) {
        std::thread::sleep(wait);
    }
}

/// Runs `f` until it succeeds or the policy says to stop, sleeping on the
/// current thread between attempts.
///
/// The error returned is exactly the one `f` produced last.
pub fn run_with_retry<T, E, F>(policy: &RetryPolicy, operation: &str, f: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: Classify + Display,
{
    run_with_retry_using(policy, &ThreadSleeper, operation, f)
}

/// Like [`run_with_retry`] with a caller-supplied sleeper.
pub fn run_with_retry_using<T, E, F, S>(
    policy: &RetryPolicy,
    sleeper: &S,
    operation: &str,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: Classify + Display,
    S: Sleeper + ?Sized,
{
    let mut schedule = policy.start();
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => {
                if !policy.qualifies(&e.failure()) {
                    return Err(e);
                }
                let Some(wait) = schedule.next_wait() else {
                    return Err(e);
                };
                tracing::warn!(
                    operation,
                    error = %e,
                    wait_secs = wait.as_secs_f64(),
                    remaining = schedule.remaining(),
                    "retrying"
                );
                sleeper.sleep(wait);
            }
        }
    }
}
