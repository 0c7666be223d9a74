//! `bdit test-mode` – show what the environment enables.

use bdit_core::testmode::{TestMode, STAGE_VAR, TESTMODE_VAR};

pub fn run_test_mode() {
    let mode = TestMode::from_env();
    println!("{:<20} {}", TESTMODE_VAR, mode.mode);
    println!("{:<20} {:?}", STAGE_VAR, mode.stage);
    println!(
        "{:<20} {}",
        "controlled access",
        if mode.controlled_access() { "enabled" } else { "skipped" }
    );
}
