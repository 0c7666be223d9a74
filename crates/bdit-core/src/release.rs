//! Data-commons release versions across environments.
//!
//! Staging may be on the same release as production or ahead of it. If
//! production moves first, a release shipped without cross-org testing.

use serde::Deserialize;
use std::cmp::Ordering;

use crate::http::{HttpClient, RequestError};
use crate::retry::{run_with_retry_using, RetryPolicy, Sleeper};

pub const DEFAULT_PRODUCTION_URL: &str = "https://gen3.biodatacatalyst.nhlbi.nih.gov";
pub const DEFAULT_STAGING_URL: &str = "https://staging.gen3.biodatacatalyst.nhlbi.nih.gov";

const VERSION_PATH: &str = "/index/_version";

#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("staging release {staging} is behind production release {production}")]
    StagingBehind { staging: String, production: String },
}

#[derive(Debug, Deserialize)]
struct VersionBody {
    version: String,
}

/// Versions observed on both environments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReport {
    pub staging: String,
    pub production: String,
}

/// Compare release strings such as `2021.12` or `2021.10-rc1`.
///
/// Dot-separated parts are compared in order. Within a part the leading
/// digits compare numerically and the remainder as a string, so `2021.10-rc1`
/// sorts after `2021.9`. Parts without leading digits compare as strings.
/// When one version is a prefix of the other, the longer one is newer.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.trim().split('.');
    let mut right = b.trim().split('.');
    loop {
        let ord = match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (Some(x), Some(y)) => compare_part(x, y),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
}

fn compare_part(a: &str, b: &str) -> Ordering {
    match (numeric_prefix(a), numeric_prefix(b)) {
        (Some((x, x_rest)), Some((y, y_rest))) => x.cmp(&y).then_with(|| x_rest.cmp(y_rest)),
        _ => a.cmp(b),
    }
}

fn numeric_prefix(part: &str) -> Option<(u64, &str)> {
    let end = part
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(part.len());
    let n = part[..end].parse().ok()?;
    Some((n, &part[end..]))
}

/// `GET /index/_version` and return its `version` field.
pub fn fetch_version<S>(
    client: &HttpClient,
    policy: &RetryPolicy,
    sleeper: &S,
) -> Result<String, RequestError>
where
    S: Sleeper + ?Sized,
{
    let op = format!("release: version of {}", client.base_url());
    let body = run_with_retry_using(policy, sleeper, &op, || {
        client.get(VERSION_PATH)?.expect_status(200)?.json::<VersionBody>()
    })?;
    Ok(body.version)
}

/// Fail when staging runs an older release than production.
pub fn check_staging_not_behind<S>(
    staging: &HttpClient,
    production: &HttpClient,
    policy: &RetryPolicy,
    sleeper: &S,
) -> Result<VersionReport, ReleaseError>
where
    S: Sleeper + ?Sized,
{
    tracing::info!("checking the release version on production...");
    let production_version = fetch_version(production, policy, sleeper)?;
    tracing::info!("checking the release version on staging...");
    let staging_version = fetch_version(staging, policy, sleeper)?;

    if compare_versions(&staging_version, &production_version) == Ordering::Less {
        return Err(ReleaseError::StagingBehind {
            staging: staging_version,
            production: production_version,
        });
    }
    Ok(VersionReport {
        staging: staging_version,
        production: production_version,
    })
}
