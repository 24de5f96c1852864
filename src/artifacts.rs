//! Run artifact writing

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of one setup step
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Succeeded,
    Failed,
    Skipped,
}

/// Record of one setup step for the run summary
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub name: String,
    pub status: StepStatus,
    pub duration_secs: f64,
}

impl StepRecord {
    pub fn new(name: &str, status: StepStatus, duration: Duration) -> Self {
        Self {
            name: name.to_string(),
            status,
            duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn skipped(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: StepStatus::Skipped,
            duration_secs: 0.0,
        }
    }
}

/// Summary of a setup run, written to the artifact directory as JSON
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub manifests_url: String,
    pub install_operators: bool,
    pub install_dsc: bool,
    pub succeeded: bool,
    pub steps: Vec<StepRecord>,
}

/// Writes run artifacts under a single directory
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    /// Create the artifact directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create artifact directory: {}", dir.display()))?;

        Ok(Self { dir })
    }

    /// Write an applied manifest for later inspection
    pub fn write_manifest(&self, name: &str, contents: &str) -> Result<PathBuf> {
        self.write_file(name, contents)
    }

    /// Write the run summary as pretty JSON
    pub fn write_summary(&self, summary: &RunSummary) -> Result<PathBuf> {
        let json =
            serde_json::to_string_pretty(summary).context("Failed to serialize run summary")?;
        self.write_file("setup-summary.json", &json)
    }

    fn write_file(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.join(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write artifact: {}", path.display()))?;

        crate::log_info!("Wrote artifact {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_summary() -> RunSummary {
        RunSummary {
            manifests_url: crate::manifests::DEFAULT_MANIFESTS_URL.to_string(),
            install_operators: true,
            install_dsc: false,
            succeeded: true,
            steps: vec![
                StepRecord::new(
                    "resolve-manifests",
                    StepStatus::Succeeded,
                    Duration::from_millis(1500),
                ),
                StepRecord::skipped("install-dsc"),
            ],
        }
    }

    #[test]
    fn test_creates_directory_and_writes_under_it() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("out");

        let writer = ArtifactWriter::new(&target).unwrap();
        let path = writer.write_manifest("dsc.yaml", "kind: DataScienceCluster\n").unwrap();

        assert!(target.is_dir());
        assert!(path.starts_with(&target));
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "kind: DataScienceCluster\n"
        );
    }

    #[test]
    fn test_summary_json_shape() {
        let temp = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(temp.path()).unwrap();

        let path = writer.write_summary(&sample_summary()).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();

        assert_eq!(parsed["install_operators"], true);
        assert_eq!(parsed["succeeded"], true);
        assert_eq!(parsed["steps"][0]["name"], "resolve-manifests");
        assert_eq!(parsed["steps"][0]["status"], "succeeded");
        assert_eq!(parsed["steps"][1]["status"], "skipped");
    }

    #[test]
    fn test_unwritable_directory_fails() {
        // A path below an existing file can never be created
        let temp = tempfile::NamedTempFile::new().unwrap();
        let bad_dir = temp.path().join("nested");
        assert!(ArtifactWriter::new(bad_dir).is_err());
    }
}
