//! Progress indicators for long-running operations

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate operations
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("Failed to create spinner template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Spinner wrapper for polling waits against the cluster
pub struct PollProgress {
    pb: ProgressBar,
    resource: String,
}

impl PollProgress {
    pub fn new(resource: &str) -> Self {
        let message = format!("Waiting for {}", resource);
        Self {
            pb: create_spinner(&message),
            resource: resource.to_string(),
        }
    }

    pub fn tick(&self, attempt: u32, max_attempts: u32) {
        self.pb.set_message(format!(
            "Waiting for {} ({}/{})",
            self.resource, attempt, max_attempts
        ));
    }

    pub fn finish_success(&self) {
        self.pb
            .finish_with_message(format!("✓ {} found", self.resource));
    }

    pub fn finish_timeout(&self) {
        self.pb
            .finish_with_message(format!("✗ timed out waiting for {}", self.resource));
    }
}

/// Helper to run a function with a spinner and show the result
pub fn with_spinner_result<F, T, E>(message: &str, success_msg: &str, f: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: std::fmt::Display,
{
    let pb = create_spinner(message);
    match f() {
        Ok(result) => {
            pb.finish_with_message(format!("✓ {}", success_msg));
            Ok(result)
        }
        Err(e) => {
            pb.finish_with_message(format!("✗ Failed: {}", e));
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_spinner() {
        let pb = create_spinner("Test operation");
        assert!(pb.message().contains("Test operation"));
        pb.finish_and_clear();
    }

    #[test]
    fn test_poll_progress() {
        let poll = PollProgress::new("catalog source community-operators");
        poll.tick(1, 60);
        poll.finish_success();
    }

    #[test]
    fn test_with_spinner_result() {
        let result: Result<i32, String> = with_spinner_result("Testing", "done", || Ok(42));
        assert_eq!(result.unwrap(), 42);
    }
}
