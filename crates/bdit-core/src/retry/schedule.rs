//! Backoff schedule: the ordered waits consumed one per retry.

use std::collections::VecDeque;
use std::time::Duration;

/// Default waits, in seconds (about 16s of backoff in the worst case).
pub const DEFAULT_BACKOFF_SECS: [u64; 5] = [1, 1, 2, 4, 8];

/// Rejected schedule entry (only fractional-second input can be invalid).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    #[error("backoff entry #{index} is negative or not finite: {value}")]
    InvalidWait { index: usize, value: f64 },
}

/// Ordered, non-negative wait durations consumed front to back.
///
/// A policy keeps one of these as a template and hands a fresh clone to every
/// invocation chain, so exhausting one chain never affects another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffSchedule {
    waits: VecDeque<Duration>,
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self::from_secs(DEFAULT_BACKOFF_SECS)
    }
}

impl BackoffSchedule {
    pub fn new<I>(waits: I) -> Self
    where
        I: IntoIterator<Item = Duration>,
    {
        Self {
            waits: waits.into_iter().collect(),
        }
    }

    /// Schedule with no entries: the first failure is always terminal.
    pub fn empty() -> Self {
        Self {
            waits: VecDeque::new(),
        }
    }

    pub fn from_secs<I>(secs: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        Self::new(secs.into_iter().map(Duration::from_secs))
    }

    /// Build from fractional seconds (as found in config.toml).
    pub fn from_secs_f64(secs: &[f64]) -> Result<Self, ScheduleError> {
        let mut waits = VecDeque::with_capacity(secs.len());
        for (index, &value) in secs.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(ScheduleError::InvalidWait { index, value });
            }
            waits.push_back(Duration::from_secs_f64(value));
        }
        Ok(Self { waits })
    }

    /// Remove and return the next wait, or `None` once exhausted.
    pub fn next_wait(&mut self) -> Option<Duration> {
        self.waits.pop_front()
    }

    pub fn is_exhausted(&self) -> bool {
        self.waits.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.waits.len()
    }

    pub fn waits(&self) -> impl Iterator<Item = Duration> + '_ {
        self.waits.iter().copied()
    }
}
