//! Configuration file support for trustyai-setup

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub behavior: Behavior,

    #[serde(default)]
    pub timeouts: Timeouts,
}

/// Default values for common options
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Defaults {
    #[serde(default = "default_manifests_url")]
    pub manifests_url: String,

    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: String,

    /// Optional path to the operator config YAML.
    /// If not set, the built-in operator list is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_config: Option<String>,

    /// Optional path to a kubeconfig file.
    /// If not set, the ambient oc login context is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig_path: Option<String>,
}

/// Behavior settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Behavior {
    #[serde(default = "default_true")]
    pub confirm_on_limited_permissions: bool,
}

/// Polling intervals and wait budgets, in seconds
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Timeouts {
    #[serde(default = "default_recheck_interval")]
    pub recheck_interval: u64,

    #[serde(default = "default_catalog_source_timeout")]
    pub catalog_source: u64,

    #[serde(default = "default_package_manifest_timeout")]
    pub package_manifest: u64,

    #[serde(default = "default_csv_timeout")]
    pub csv: u64,

    #[serde(default = "default_pod_timeout")]
    pub pod: u64,
}

// Default value functions
fn default_manifests_url() -> String {
    crate::manifests::DEFAULT_MANIFESTS_URL.to_string()
}

fn default_artifact_dir() -> String {
    "artifacts".to_string()
}

fn default_true() -> bool {
    true
}

fn default_recheck_interval() -> u64 {
    5
}

fn default_catalog_source_timeout() -> u64 {
    300
}

fn default_package_manifest_timeout() -> u64 {
    900
}

fn default_csv_timeout() -> u64 {
    600
}

fn default_pod_timeout() -> u64 {
    300
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            manifests_url: default_manifests_url(),
            artifact_dir: default_artifact_dir(),
            operator_config: None,
            kubeconfig_path: None,
        }
    }
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            confirm_on_limited_permissions: default_true(),
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            recheck_interval: default_recheck_interval(),
            catalog_source: default_catalog_source_timeout(),
            package_manifest: default_package_manifest_timeout(),
            csv: default_csv_timeout(),
            pod: default_pod_timeout(),
        }
    }
}

impl Settings {
    /// Load settings from file or return defaults
    pub fn load() -> Self {
        match Self::find_config_file() {
            Some(path) => Self::load_or_default(&path),
            None => Self::default(),
        }
    }

    /// Load from a specific file; a file that exists but cannot be parsed is
    /// ignored with a warning rather than silently dropping the overrides
    fn load_or_default(path: &PathBuf) -> Self {
        match Self::load_from_file(path) {
            Ok(settings) => settings,
            Err(e) => {
                crate::log_warn!("Ignoring config file {}: {:#}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(settings)
    }

    /// Find config file in standard locations
    /// Priority:
    /// 1. .trustyai-setup.toml in current directory
    /// 2. ~/.config/trustyai-setup/config.toml (XDG config directory)
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory
        let local_config = PathBuf::from(".trustyai-setup.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        // Check XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("trustyai-setup").join("config.toml");
            if xdg_config.exists() {
                return Some(xdg_config);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(
            settings.defaults.manifests_url,
            crate::manifests::DEFAULT_MANIFESTS_URL
        );
        assert_eq!(settings.defaults.artifact_dir, "artifacts");
        assert_eq!(settings.timeouts.recheck_interval, 5);
        assert_eq!(settings.timeouts.catalog_source, 300);
        assert_eq!(settings.timeouts.package_manifest, 900);
        assert!(settings.behavior.confirm_on_limited_permissions);
    }

    #[test]
    fn test_settings_serialization() {
        let settings = Settings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        assert!(toml_str.contains("manifests_url"));
        assert!(toml_str.contains("artifact_dir"));
    }

    #[test]
    fn test_settings_deserialization() {
        let toml_str = r#"
[defaults]
manifests_url = "https://example.com/tarball/feature-branch"
artifact_dir = "/tmp/ci-artifacts"

[timeouts]
recheck_interval = 10
"#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(
            settings.defaults.manifests_url,
            "https://example.com/tarball/feature-branch"
        );
        assert_eq!(settings.defaults.artifact_dir, "/tmp/ci-artifacts");
        assert_eq!(settings.timeouts.recheck_interval, 10);
        // Unset sections keep their defaults
        assert_eq!(settings.timeouts.package_manifest, 900);
        assert!(settings.behavior.confirm_on_limited_permissions);
    }

    #[test]
    fn test_load_from_missing_file() {
        let path = PathBuf::from("/nonexistent/trustyai-setup.toml");
        assert!(Settings::load_from_file(&path).is_err());
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        use std::io::Write;

        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(b"[timeouts]\nrecheck_interval = \"not-a-number\"\n")
            .unwrap();

        // The warn-and-fallback path must still yield usable settings
        let settings = Settings::load_or_default(&temp.path().to_path_buf());
        assert_eq!(settings.timeouts.recheck_interval, 5);
        assert_eq!(
            settings.defaults.manifests_url,
            crate::manifests::DEFAULT_MANIFESTS_URL
        );
    }

    #[test]
    fn test_valid_file_is_not_replaced_by_defaults() {
        use std::io::Write;

        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(b"[timeouts]\nrecheck_interval = 30\n").unwrap();

        let settings = Settings::load_or_default(&temp.path().to_path_buf());
        assert_eq!(settings.timeouts.recheck_interval, 30);
    }
}
