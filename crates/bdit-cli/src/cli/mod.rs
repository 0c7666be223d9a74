//! CLI for the BDCat integration checks.

mod commands;

use anyhow::Result;
use bdit_core::broker::SbEnv;
use bdit_core::config::{self, BditConfig};
use clap::{Parser, Subcommand};

use commands::{
    run_broker, run_config_path, run_submission_check, run_test_mode, run_version_check,
    BrokerRunArgs,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "bdit")]
#[command(about = "BDCat cross-platform integration checks", long_about = None)]
pub struct Cli {
    /// Mirror info-level logs to stderr (warnings and retries are always shown).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Check that staging runs the same data-commons release as production, or a newer one.
    VersionCheck {
        /// Staging deployment base URL (overrides config).
        #[arg(long, value_name = "URL")]
        staging_url: Option<String>,
        /// Production deployment base URL (overrides config).
        #[arg(long, value_name = "URL")]
        production_url: Option<String>,
    },

    /// Run a partner test plan through the QA broker and require every test to pass.
    BrokerRun {
        /// Target environment; defaults to $BDCAT_STAGE (staging).
        #[arg(long, value_name = "ENV")]
        env: Option<SbEnv>,
        /// Broker-side test plan path.
        #[arg(long, default_value = "sbgtests.plans.bdc")]
        plan: String,
        /// Only run these test ids from the plan (repeatable).
        #[arg(long = "subset", value_name = "TEST_ID")]
        subset: Vec<String>,
        /// Give up waiting for the run after N seconds (overrides config).
        #[arg(long, value_name = "N")]
        timeout_secs: Option<u64>,
        /// Seconds between task state checks (overrides config).
        #[arg(long, value_name = "N")]
        poll_secs: Option<u64>,
    },

    /// Check that the workflow API rejects an anonymous submission with 401.
    SubmissionCheck {
        /// Workflow API base URL (overrides config).
        #[arg(long, value_name = "URL")]
        url: Option<String>,
        /// Workspace namespace to submit into.
        #[arg(long, default_value = "default")]
        namespace: String,
        /// Workspace name to submit into.
        #[arg(long, default_value = "default")]
        workspace: String,
    },

    /// Show which live checks the environment enables.
    TestMode,

    /// Print the config file location.
    ConfigPath,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            CliCommand::VersionCheck {
                staging_url,
                production_url,
            } => run_version_check(&load_config()?, staging_url, production_url)?,
            CliCommand::BrokerRun {
                env,
                plan,
                subset,
                timeout_secs,
                poll_secs,
            } => run_broker(
                &load_config()?,
                BrokerRunArgs {
                    env,
                    plan,
                    subset,
                    timeout_secs,
                    poll_secs,
                },
            )?,
            CliCommand::SubmissionCheck {
                url,
                namespace,
                workspace,
            } => run_submission_check(&load_config()?, url, &namespace, &workspace)?,
            CliCommand::TestMode => run_test_mode(),
            CliCommand::ConfigPath => run_config_path()?,
        }

        Ok(())
    }
}

fn load_config() -> Result<BditConfig> {
    let cfg = config::load_or_init()?.with_env_overrides();
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

#[cfg(test)]
mod tests;
