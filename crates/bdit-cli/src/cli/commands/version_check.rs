//! `bdit version-check` – staging must not lag production.

use anyhow::{Context, Result};
use bdit_core::config::BditConfig;
use bdit_core::http::HttpClient;
use bdit_core::release;
use bdit_core::retry::ThreadSleeper;

pub fn run_version_check(
    cfg: &BditConfig,
    staging_url: Option<String>,
    production_url: Option<String>,
) -> Result<()> {
    let staging_url = staging_url.unwrap_or_else(|| cfg.release.staging_url.clone());
    let production_url = production_url.unwrap_or_else(|| cfg.release.production_url.clone());
    let policy = cfg.retry.to_policy()?;

    let staging = HttpClient::new(&staging_url).context("staging URL")?;
    let production = HttpClient::new(&production_url).context("production URL")?;

    let report = release::check_staging_not_behind(&staging, &production, &policy, &ThreadSleeper)?;
    println!("production {}  {}", report.production, production_url);
    println!("staging    {}  {}", report.staging, staging_url);
    Ok(())
}
