//! `bdit submission-check` – the workflow API must refuse anonymous submissions.

use anyhow::{Context, Result};
use bdit_core::config::BditConfig;
use bdit_core::http::HttpClient;
use bdit_core::retry::ThreadSleeper;
use bdit_core::workflow::{self, Submission};

pub fn run_submission_check(
    cfg: &BditConfig,
    url: Option<String>,
    namespace: &str,
    workspace: &str,
) -> Result<()> {
    let url = url.unwrap_or_else(|| cfg.workflow.url.clone());
    let policy = cfg.retry.to_policy()?;
    let client = HttpClient::new(&url).context("workflow URL")?;

    workflow::check_submission_unauthorized(
        &client,
        namespace,
        workspace,
        &Submission::placeholder("default", "default"),
        &policy,
        &ThreadSleeper,
    )?;
    println!("anonymous submission rejected  {}", url);
    Ok(())
}
