//! OpenShift CLI (oc) wrapper utilities

use anyhow::{Context, Result, anyhow};
use std::path::Path;
use std::process::Command;

/// Run an oc command with optional kubeconfig
pub fn run_oc(args: &[&str], kubeconfig: Option<&Path>) -> Result<()> {
    let mut cmd = Command::new("oc");

    if let Some(kc) = kubeconfig {
        cmd.env("KUBECONFIG", kc);
    }

    cmd.args(args);

    let status = cmd.status().context("Failed to run oc command")?;

    if !status.success() {
        return Err(anyhow!("oc command failed: {}", args.join(" ")));
    }

    Ok(())
}

/// Run oc and capture stdout
pub fn run_oc_output(args: &[&str], kubeconfig: Option<&Path>) -> Result<String> {
    let mut cmd = Command::new("oc");

    if let Some(kc) = kubeconfig {
        cmd.env("KUBECONFIG", kc);
    }

    cmd.args(args);

    let output = cmd.output().context("Failed to run oc command")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "oc command failed: {}\n{}",
            args.join(" "),
            stderr
        ));
    }

    Ok(String::from_utf8(output.stdout)?)
}

/// Get a resource listing as parsed JSON
pub fn get_json(args: &[&str], kubeconfig: Option<&Path>) -> Result<serde_json::Value> {
    let mut full_args = vec!["get"];
    full_args.extend_from_slice(args);
    full_args.extend_from_slice(&["-o", "json"]);

    let stdout = run_oc_output(&full_args, kubeconfig)?;

    serde_json::from_str(&stdout).context("Failed to parse oc JSON output")
}

/// Apply a YAML manifest from string
pub fn apply_yaml(yaml: &str, kubeconfig: Option<&Path>) -> Result<()> {
    pipe_yaml(&["apply", "-f", "-"], yaml, kubeconfig)
}

/// Create a resource from a YAML manifest
pub fn create_yaml(yaml: &str, kubeconfig: Option<&Path>) -> Result<()> {
    pipe_yaml(&["create", "-f", "-"], yaml, kubeconfig)
}

fn pipe_yaml(args: &[&str], yaml: &str, kubeconfig: Option<&Path>) -> Result<()> {
    let mut cmd = Command::new("oc");

    if let Some(kc) = kubeconfig {
        cmd.env("KUBECONFIG", kc);
    }

    cmd.args(args);

    let mut child = cmd
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::inherit())
        .stderr(std::process::Stdio::inherit())
        .spawn()
        .context("Failed to spawn oc")?;

    if let Some(mut stdin) = child.stdin.take() {
        use std::io::Write;
        stdin
            .write_all(yaml.as_bytes())
            .context("Failed to write YAML to oc")?;
    }

    let status = child.wait().context("Failed to wait for oc")?;

    if !status.success() {
        return Err(anyhow!("oc {} failed", args.join(" ")));
    }

    Ok(())
}

/// Merge-patch a namespaced resource
pub fn patch_merge(
    resource: &str,
    name: &str,
    namespace: &str,
    patch: &str,
    kubeconfig: Option<&Path>,
) -> Result<()> {
    run_oc(
        &[
            "patch", resource, name, "-n", namespace, "--type", "merge", "-p", patch,
        ],
        kubeconfig,
    )
}

/// Check whether a resource exists
pub fn resource_exists(args: &[&str], kubeconfig: Option<&Path>) -> bool {
    let mut full_args = vec!["get"];
    full_args.extend_from_slice(args);
    run_oc_output(&full_args, kubeconfig).is_ok()
}

/// Extract `.items[*].metadata.name` from an oc list response
pub fn item_names(list: &serde_json::Value) -> Vec<String> {
    list["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["metadata"]["name"].as_str())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_names() {
        let list: serde_json::Value = serde_json::json!({
            "items": [
                {"metadata": {"name": "community-operators"}},
                {"metadata": {"name": "redhat-operators"}},
            ]
        });
        assert_eq!(
            item_names(&list),
            vec!["community-operators", "redhat-operators"]
        );
    }

    #[test]
    fn test_item_names_empty_list() {
        let list: serde_json::Value = serde_json::json!({"items": []});
        assert!(item_names(&list).is_empty());
    }

    #[test]
    fn test_item_names_not_a_list() {
        let value: serde_json::Value = serde_json::json!({"kind": "Status"});
        assert!(item_names(&value).is_empty());
    }
}
