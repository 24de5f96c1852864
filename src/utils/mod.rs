//! Utility modules for trustyai-setup

pub mod dryrun;
pub mod errors;
pub mod logger;
pub mod prereqs;
pub mod progress;
pub mod prompt;

// Re-export commonly used items
pub use errors::SetupError;
pub use logger::{header, log_error, log_info, log_warn};
pub use prereqs::{CommandPrereq, Prerequisite};
pub use prompt::confirm;
