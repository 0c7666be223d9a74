//! `bdit config-path` – print where config.toml lives.

use anyhow::Result;
use bdit_core::config;

pub fn run_config_path() -> Result<()> {
    println!("{}", config::config_path()?.display());
    Ok(())
}
