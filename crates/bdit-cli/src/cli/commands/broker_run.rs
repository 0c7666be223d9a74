//! `bdit broker-run` – start a broker test plan, wait for it, check the report.

use anyhow::{Context, Result};
use bdit_core::broker::{BrokerClient, SbEnv};
use bdit_core::config::{self, BditConfig};
use bdit_core::http::HttpClient;
use bdit_core::testmode::{Stage, TestMode};
use std::time::Duration;

#[derive(Debug)]
pub struct BrokerRunArgs {
    pub env: Option<SbEnv>,
    pub plan: String,
    pub subset: Vec<String>,
    pub timeout_secs: Option<u64>,
    pub poll_secs: Option<u64>,
}

pub fn run_broker(cfg: &BditConfig, args: BrokerRunArgs) -> Result<()> {
    let env = args.env.unwrap_or_else(|| match TestMode::from_env().stage {
        Stage::Staging => SbEnv::Staging,
        Stage::Production => SbEnv::Production,
    });
    let mut opts = cfg.broker.wait_options();
    if let Some(secs) = args.timeout_secs {
        opts.timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = args.poll_secs {
        opts.poll_interval = Duration::from_secs(secs);
    }
    let subset = (!args.subset.is_empty()).then_some(args.subset);

    let token = config::broker_token();
    if token.is_none() {
        tracing::warn!("{} is unset; calling the broker without a token", config::BROKER_TOKEN_VAR);
    }
    let http = HttpClient::new(&cfg.broker.url)
        .context("broker URL")?
        .with_bearer_token(token);
    let broker = BrokerClient::new(http, cfg.retry.to_policy()?);

    let report = broker.execute(env, &args.plan, subset, opts)?;
    println!(
        "{} on {}: {} test(s), all passed or skipped",
        args.plan,
        env,
        report.results.len()
    );
    Ok(())
}
