//! CLI command handlers, one per file.

mod broker_run;
mod config_path;
mod submission_check;
mod test_mode;
mod version_check;

pub use broker_run::{run_broker, BrokerRunArgs};
pub use config_path::run_config_path;
pub use submission_check::run_submission_check;
pub use test_mode::run_test_mode;
pub use version_check::run_version_check;
