//! Dry-run mode utilities

use colored::Colorize;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};

static DRY_RUN: AtomicBool = AtomicBool::new(false);

/// Enable dry-run mode for this process (set from the --dry-run flag)
pub fn set_dry_run(enabled: bool) {
    DRY_RUN.store(enabled, Ordering::SeqCst);
}

/// Check if dry-run mode is enabled, via the flag or the
/// TRUSTYAI_SETUP_DRY_RUN environment variable
pub fn is_dry_run() -> bool {
    DRY_RUN.load(Ordering::SeqCst) || env::var("TRUSTYAI_SETUP_DRY_RUN").is_ok()
}

/// Log the planned actions as a numbered list without executing anything
pub fn log_actions(actions: &[String]) {
    println!(
        "{}",
        "[DRY RUN] Would perform the following actions:"
            .cyan()
            .bold()
    );
    println!();

    for (i, action) in actions.iter().enumerate() {
        println!("  {}. {}", i + 1, action);
    }

    println!();
    println!("{}", "No changes were made (--dry-run mode)".yellow());
}
