//! What a failure is, and which failures a policy is willing to retry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::schedule::BackoffSchedule;

/// High-level classification of an error for retry purposes.
///
/// Callers map curl errors, IO failures or HTTP status responses into these
/// kinds (see [`super::Classify`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Wildcard tag for matcher kind sets; classification never yields it.
    Any,
    /// Server answered with an unexpected HTTP status.
    Http,
    /// Network-level failure (refused, reset, DNS, empty reply).
    Connection,
    /// Operation timed out (connect/read).
    Timeout,
    /// Anything else.
    Other,
}

/// Classified view of a caught error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    /// Status code, only meaningful for [`FailureKind::Http`].
    pub status: Option<u16>,
}

impl Failure {
    pub fn http(status: u16) -> Self {
        Self {
            kind: FailureKind::Http,
            status: Some(status),
        }
    }

    pub fn of_kind(kind: FailureKind) -> Self {
        Self { kind, status: None }
    }

    pub fn other() -> Self {
        Self::of_kind(FailureKind::Other)
    }
}

/// Decides whether a failure qualifies for a retry.
///
/// Built once per policy by [`FailureMatcher::new`] and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FailureMatcher {
    /// Every failure qualifies.
    #[default]
    MatchAny,
    /// Only the listed kinds qualify. HTTP failures carrying a status are
    /// further filtered by `status_codes` when it is non-empty.
    Kinds {
        kinds: BTreeSet<FailureKind>,
        status_codes: BTreeSet<u16>,
    },
}

impl FailureMatcher {
    /// Compute the effective matcher.
    ///
    /// No kinds and no codes retries everything; codes without kinds imply
    /// [`FailureKind::Http`].
    pub fn new<K, C>(kinds: K, status_codes: C) -> Self
    where
        K: IntoIterator<Item = FailureKind>,
        C: IntoIterator<Item = u16>,
    {
        let mut kinds: BTreeSet<FailureKind> = kinds.into_iter().collect();
        let status_codes: BTreeSet<u16> = status_codes.into_iter().collect();
        if kinds.is_empty() && status_codes.is_empty() {
            return FailureMatcher::MatchAny;
        }
        if kinds.is_empty() {
            kinds.insert(FailureKind::Http);
        }
        FailureMatcher::Kinds {
            kinds,
            status_codes,
        }
    }

    pub fn kinds<K>(kinds: K) -> Self
    where
        K: IntoIterator<Item = FailureKind>,
    {
        Self::new(kinds, [])
    }

    pub fn status_codes<C>(status_codes: C) -> Self
    where
        C: IntoIterator<Item = u16>,
    {
        Self::new([], status_codes)
    }

    pub fn matches(&self, failure: &Failure) -> bool {
        match self {
            FailureMatcher::MatchAny => true,
            FailureMatcher::Kinds {
                kinds,
                status_codes,
            } => {
                let kind_ok =
                    kinds.contains(&FailureKind::Any) || kinds.contains(&failure.kind);
                match (failure.kind, failure.status) {
                    (FailureKind::Http, Some(status)) if !status_codes.is_empty() => {
                        kind_ok && status_codes.contains(&status)
                    }
                    _ => kind_ok,
                }
            }
        }
    }
}

/// Fixed-schedule retry policy.
///
/// Immutable once built: every call to [`super::run_with_retry`] starts from
/// a fresh copy of `schedule`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    pub schedule: BackoffSchedule,
    pub matcher: FailureMatcher,
}

impl RetryPolicy {
    pub fn new(schedule: BackoffSchedule, matcher: FailureMatcher) -> Self {
        Self { schedule, matcher }
    }

    /// Default schedule, retrying only HTTP failures with one of `codes`.
    pub fn on_status_codes<C>(codes: C) -> Self
    where
        C: IntoIterator<Item = u16>,
    {
        Self::new(BackoffSchedule::default(), FailureMatcher::status_codes(codes))
    }

    pub fn with_schedule(mut self, schedule: BackoffSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_matcher(mut self, matcher: FailureMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Fresh schedule for one invocation chain.
    pub fn start(&self) -> BackoffSchedule {
        self.schedule.clone()
    }

    pub fn qualifies(&self, failure: &Failure) -> bool {
        self.matcher.matches(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_configured_matches_any() {
        let m = FailureMatcher::new([], []);
        assert_eq!(m, FailureMatcher::MatchAny);
        assert!(m.matches(&Failure::other()));
        assert!(m.matches(&Failure::http(404)));
        assert!(m.matches(&Failure::of_kind(FailureKind::Timeout)));
    }

    #[test]
    fn codes_without_kinds_imply_http() {
        let m = FailureMatcher::status_codes([409]);
        match &m {
            FailureMatcher::Kinds { kinds, .. } => {
                assert_eq!(kinds.iter().copied().collect::<Vec<_>>(), vec![FailureKind::Http]);
            }
            other => panic!("expected Kinds, got {:?}", other),
        }
        assert!(m.matches(&Failure::http(409)));
        assert!(!m.matches(&Failure::http(404)));
        assert!(!m.matches(&Failure::of_kind(FailureKind::Connection)));
    }

    #[test]
    fn http_without_codes_qualifies_on_kind() {
        let m = FailureMatcher::kinds([FailureKind::Http]);
        assert!(m.matches(&Failure::http(418)));
        assert!(!m.matches(&Failure::other()));
    }

    #[test]
    fn http_failure_without_status_skips_code_filter() {
        let m = FailureMatcher::new([FailureKind::Http], [503]);
        assert!(m.matches(&Failure::of_kind(FailureKind::Http)));
    }

    #[test]
    fn non_http_kinds_ignore_status_codes() {
        let m = FailureMatcher::new([FailureKind::Http, FailureKind::Connection], [500]);
        assert!(m.matches(&Failure::of_kind(FailureKind::Connection)));
        assert!(!m.matches(&Failure::of_kind(FailureKind::Timeout)));
        assert!(m.matches(&Failure::http(500)));
        assert!(!m.matches(&Failure::http(502)));
    }

    #[test]
    fn wildcard_kind_still_filters_http_codes() {
        let m = FailureMatcher::new([FailureKind::Any], [409]);
        assert!(m.matches(&Failure::other()));
        assert!(m.matches(&Failure::of_kind(FailureKind::Timeout)));
        assert!(m.matches(&Failure::http(409)));
        assert!(!m.matches(&Failure::http(404)));
    }

    #[test]
    fn independently_built_policies_do_not_share_config() {
        let a = RetryPolicy::on_status_codes([409]);
        let b = RetryPolicy::default();
        assert_eq!(b.matcher, FailureMatcher::MatchAny);
        assert!(!a.qualifies(&Failure::other()));
        assert!(b.qualifies(&Failure::other()));
    }

    #[test]
    fn kinds_deserialize_lowercase() {
        #[derive(Deserialize)]
        struct K {
            kinds: Vec<FailureKind>,
        }
        let k: K = toml::from_str(r#"kinds = ["http", "connection", "any"]"#).unwrap();
        assert_eq!(
            k.kinds,
            vec![FailureKind::Http, FailureKind::Connection, FailureKind::Any]
        );
    }
}
