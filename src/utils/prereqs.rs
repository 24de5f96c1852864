//! Prerequisite checking for required local tools

use anyhow::{Result, anyhow};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrereqError {
    #[error("Tool '{name}' not found")]
    NotFound { name: String, hint: String },
}

/// Trait for checking prerequisites
pub trait Prerequisite {
    /// Name of the prerequisite tool
    fn name(&self) -> &str;

    /// Check if the tool is available
    fn check(&self) -> Result<(), PrereqError>;

    /// Installation hint for the user
    fn install_hint(&self) -> &str;
}

/// Basic prerequisite that checks if a command exists on PATH
pub struct CommandPrereq {
    pub name: String,
    pub hint: String,
}

impl CommandPrereq {
    pub fn new(name: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hint: hint.into(),
        }
    }
}

impl Prerequisite for CommandPrereq {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self) -> Result<(), PrereqError> {
        which::which(&self.name).map_err(|_| PrereqError::NotFound {
            name: self.name.clone(),
            hint: self.hint.clone(),
        })?;
        Ok(())
    }

    fn install_hint(&self) -> &str {
        &self.hint
    }
}

/// The OpenShift CLI, the only local tool the setup run shells out to
pub fn oc() -> CommandPrereq {
    CommandPrereq::new(
        "oc",
        "Install from: https://docs.openshift.com/container-platform/latest/cli_reference/openshift_cli/getting-started-cli.html",
    )
}

/// Fail with an install hint if any prerequisite is missing
pub fn check_all(prereqs: &[&dyn Prerequisite]) -> Result<()> {
    for prereq in prereqs {
        if let Err(PrereqError::NotFound { name, hint }) = prereq.check() {
            return Err(anyhow!("Required tool '{}' not found. {}", name, hint));
        }
    }

    Ok(())
}
