use bdit_core::logging;
use clap::Parser;

mod cli;

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();

    // Initialize logging as early as possible.
    if let Err(err) = logging::init_logging(cli.verbose) {
        logging::init_logging_stderr();
        tracing::warn!("log file unavailable, logging to stderr only: {:#}", err);
    }

    if let Err(err) = cli.run() {
        eprintln!("bdit error: {:#}", err);
        std::process::exit(1);
    }
}
