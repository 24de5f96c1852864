//! Error classification and actionable terminal output

use colored::Colorize;
use thiserror::Error;

/// Failure classes for a setup run.
///
/// Every run ends in success or exactly one of these; each class carries its
/// own exit code so CI can tell a bad manifests URL apart from a cluster-side
/// rejection or a local filesystem problem.
#[derive(Error, Debug)]
pub enum SetupError {
    /// Options or config files could not be resolved into a runnable setup
    #[error("configuration error: {0:#}")]
    Config(anyhow::Error),

    /// The manifests tarball could not be retrieved or is not a tarball
    #[error("manifest fetch failed: {0:#}")]
    Fetch(anyhow::Error),

    /// The cluster rejected an operator or custom-resource installation
    #[error("installation failed: {0:#}")]
    Install(anyhow::Error),

    /// The artifact directory could not be created or written
    #[error("artifact I/O failed: {0:#}")]
    Io(anyhow::Error),
}

impl SetupError {
    /// Exit code surfaced to the invoking CI system
    pub fn exit_code(&self) -> i32 {
        match self {
            SetupError::Config(_) => 1,
            SetupError::Fetch(_) => 2,
            SetupError::Install(_) => 3,
            SetupError::Io(_) => 4,
        }
    }

    /// Hints tailored to the failure class, shown below the error message
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            SetupError::Config(_) => vec![
                "Check the --operator-config path and its YAML syntax".to_string(),
                "Check .trustyai-setup.toml for typos".to_string(),
                "Run with --dry-run to inspect the resolved plan".to_string(),
            ],
            SetupError::Fetch(_) => vec![
                "Verify the manifests URL points at a reachable tarball".to_string(),
                "Check --trustyai_manifests_url (default is the main branch tarball)".to_string(),
                "Confirm outbound network access from the CI runner".to_string(),
            ],
            SetupError::Install(_) => vec![
                "Check cluster login and permissions: oc whoami".to_string(),
                "Inspect operator state: oc get csv,subscriptions -A".to_string(),
                "Re-run with -v for the underlying oc output".to_string(),
            ],
            SetupError::Io(_) => vec![
                "Verify the artifact directory is writable".to_string(),
                "Pass a different location with --artifact_dir".to_string(),
            ],
        }
    }

    /// Print the error with its suggestions
    pub fn display(&self) {
        crate::log_error!("{}", self);

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            eprintln!();
            eprintln!("{}", "Suggestions:".yellow().bold());
            for suggestion in &suggestions {
                eprintln!("  {} {}", "->".blue(), suggestion);
            }
        }
    }
}

/// Classify an arbitrary error as a configuration failure
pub fn config_error(err: impl Into<anyhow::Error>) -> SetupError {
    SetupError::Config(err.into())
}

/// Classify an arbitrary error as a fetch failure
pub fn fetch_error(err: impl Into<anyhow::Error>) -> SetupError {
    SetupError::Fetch(err.into())
}

/// Classify an arbitrary error as an install failure
pub fn install_error(err: impl Into<anyhow::Error>) -> SetupError {
    SetupError::Install(err.into())
}

/// Classify an arbitrary error as an artifact I/O failure
pub fn io_error(err: impl Into<anyhow::Error>) -> SetupError {
    SetupError::Io(err.into())
}
