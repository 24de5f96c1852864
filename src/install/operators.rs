//! Prerequisite operator installation via OLM

use crate::config::OperatorSpec;
use crate::config::settings::Timeouts;
use crate::install::catalog::attempts;
use crate::k8s::oc;
use crate::utils::progress::PollProgress;
use anyhow::{Context, Result, anyhow};
use std::path::Path;
use std::time::Duration;

fn namespace_yaml(namespace: &str) -> String {
    format!(
        r#"apiVersion: v1
kind: Namespace
metadata:
  name: {}
"#,
        namespace
    )
}

fn operator_group_yaml(namespace: &str) -> String {
    // An empty spec targets all namespaces, which is what the prerequisite
    // operators expect
    format!(
        r#"apiVersion: operators.coreos.com/v1
kind: OperatorGroup
metadata:
  name: {}-operator-group
  namespace: {}
spec: {{}}
"#,
        namespace, namespace
    )
}

fn subscription_yaml(operator: &OperatorSpec) -> String {
    format!(
        r#"apiVersion: operators.coreos.com/v1alpha1
kind: Subscription
metadata:
  name: {name}
  namespace: {namespace}
spec:
  channel: {channel}
  installPlanApproval: Manual
  name: {name}
  source: {source}
  sourceNamespace: openshift-marketplace
  startingCSV: {csv}
"#,
        name = operator.name,
        namespace = operator.namespace,
        channel = operator.channel,
        source = operator.catalog_source,
        csv = operator.starting_csv(),
    )
}

/// Install each operator: namespace, operator group, pinned subscription,
/// install plan approval, then wait for the CSV to succeed
pub fn install_operators(
    operators: &[OperatorSpec],
    timeouts: &Timeouts,
    kubeconfig: Option<&Path>,
) -> Result<()> {
    crate::utils::header("Installing Operators");

    for operator in operators {
        install_operator(operator, timeouts, kubeconfig)
            .with_context(|| format!("Failed to install operator {}", operator.name))?;
    }

    Ok(())
}

fn install_operator(
    operator: &OperatorSpec,
    timeouts: &Timeouts,
    kubeconfig: Option<&Path>,
) -> Result<()> {
    crate::log_info!(
        "Installing {} ({} channel, {})",
        operator.name,
        operator.channel,
        operator.catalog_source
    );

    oc::apply_yaml(&namespace_yaml(&operator.namespace), kubeconfig)
        .with_context(|| format!("Failed to create namespace {}", operator.namespace))?;

    // openshift-operators ships a global operator group already
    if operator.namespace != "openshift-operators" {
        oc::apply_yaml(&operator_group_yaml(&operator.namespace), kubeconfig)
            .with_context(|| format!("Failed to create operator group in {}", operator.namespace))?;
    }

    oc::apply_yaml(&subscription_yaml(operator), kubeconfig)
        .with_context(|| format!("Failed to create subscription for {}", operator.name))?;

    approve_install_plan(operator, timeouts, kubeconfig)?;
    wait_for_csv(operator, timeouts, kubeconfig)?;

    crate::log_info!("{} installed", operator.name);
    Ok(())
}

/// Manual approval keeps the subscription pinned to startingCSV; the plan OLM
/// creates for it still has to be approved by hand
fn approve_install_plan(
    operator: &OperatorSpec,
    timeouts: &Timeouts,
    kubeconfig: Option<&Path>,
) -> Result<()> {
    let max_attempts = attempts(timeouts.csv, timeouts.recheck_interval);
    let progress = PollProgress::new(&format!("install plan for {}", operator.name));

    for attempt in 1..=max_attempts {
        progress.tick(attempt, max_attempts);

        let plan_name = oc::get_json(
            &["subscription", &operator.name, "-n", &operator.namespace],
            kubeconfig,
        )
        .ok()
        .and_then(|sub| {
            sub["status"]["installPlanRef"]["name"]
                .as_str()
                .map(String::from)
        });

        if let Some(plan_name) = plan_name {
            progress.finish_success();
            crate::log_info!("Approving install plan {}", plan_name);
            return oc::patch_merge(
                "installplan",
                &plan_name,
                &operator.namespace,
                r#"{"spec":{"approved":true}}"#,
                kubeconfig,
            )
            .with_context(|| format!("Failed to approve install plan {}", plan_name));
        }

        std::thread::sleep(Duration::from_secs(timeouts.recheck_interval));
    }

    progress.finish_timeout();
    Err(anyhow!(
        "No install plan appeared for subscription {}",
        operator.name
    ))
}

fn wait_for_csv(
    operator: &OperatorSpec,
    timeouts: &Timeouts,
    kubeconfig: Option<&Path>,
) -> Result<()> {
    let csv_name = operator.starting_csv();
    let max_attempts = attempts(timeouts.csv, timeouts.recheck_interval);
    let progress = PollProgress::new(&format!("csv {}", csv_name));

    for attempt in 1..=max_attempts {
        progress.tick(attempt, max_attempts);

        let phase = oc::get_json(&["csv", &csv_name, "-n", &operator.namespace], kubeconfig)
            .ok()
            .and_then(|csv| csv["status"]["phase"].as_str().map(String::from));

        match phase.as_deref() {
            Some("Succeeded") => {
                progress.finish_success();
                return Ok(());
            }
            Some("Failed") => {
                progress.finish_timeout();
                return Err(anyhow!("CSV {} entered Failed phase", csv_name));
            }
            _ => {}
        }

        std::thread::sleep(Duration::from_secs(timeouts.recheck_interval));
    }

    progress.finish_timeout();
    Err(anyhow!("CSV {} did not reach Succeeded phase", csv_name))
}

/// Verify each operator's pods are running
pub fn verify_operators_running(
    operators: &[OperatorSpec],
    timeouts: &Timeouts,
    kubeconfig: Option<&Path>,
) -> Result<()> {
    crate::utils::header("Verifying Operator Pods");

    let max_attempts = attempts(timeouts.pod, timeouts.recheck_interval);

    for operator in operators {
        for target_pod in &operator.corresponding_pods {
            let progress = PollProgress::new(&format!("pod {}", target_pod));

            let mut found = false;
            for attempt in 1..=max_attempts {
                progress.tick(attempt, max_attempts);

                let pods = oc::get_json(&["pods", "-n", &operator.namespace], kubeconfig)
                    .unwrap_or_else(|_| serde_json::json!({"items": []}));

                if pod_running(&pods, target_pod) {
                    progress.finish_success();
                    crate::log_info!("{} pod running", target_pod);
                    found = true;
                    break;
                }

                std::thread::sleep(Duration::from_secs(timeouts.recheck_interval));
            }

            if !found {
                progress.finish_timeout();
                return Err(anyhow!(
                    "Timeout waiting for {} pod in {}",
                    target_pod,
                    operator.namespace
                ));
            }
        }
    }

    Ok(())
}

/// A pod counts as running when its name contains the target and at least one
/// of its containers has started
fn pod_running(pods: &serde_json::Value, target: &str) -> bool {
    let Some(items) = pods["items"].as_array() else {
        return false;
    };

    items.iter().any(|pod| {
        let name_matches = pod["metadata"]["name"]
            .as_str()
            .is_some_and(|name| name.contains(target));

        let started = pod["status"]["containerStatuses"]
            .as_array()
            .is_some_and(|statuses| {
                statuses
                    .iter()
                    .any(|status| status["started"].as_bool() == Some(true))
            });

        name_matches && started
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_operator() -> OperatorSpec {
        OperatorSpec {
            name: "opendatahub-operator".to_string(),
            channel: "fast".to_string(),
            catalog_source: "community-operators".to_string(),
            namespace: "openshift-operators".to_string(),
            version: "2.11.1".to_string(),
            corresponding_pods: vec!["opendatahub-operator-controller-manager".to_string()],
        }
    }

    #[test]
    fn test_subscription_yaml() {
        let yaml = subscription_yaml(&sample_operator());
        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(parsed["kind"], "Subscription");
        assert_eq!(parsed["spec"]["channel"], "fast");
        assert_eq!(parsed["spec"]["installPlanApproval"], "Manual");
        assert_eq!(parsed["spec"]["source"], "community-operators");
        assert_eq!(
            parsed["spec"]["startingCSV"],
            "opendatahub-operator.v2.11.1"
        );
    }

    #[test]
    fn test_operator_group_yaml() {
        let yaml = operator_group_yaml("openshift-serverless");
        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(parsed["kind"], "OperatorGroup");
        assert_eq!(parsed["metadata"]["namespace"], "openshift-serverless");
    }

    #[test]
    fn test_namespace_yaml() {
        let yaml = namespace_yaml("opendatahub");
        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed["kind"], "Namespace");
        assert_eq!(parsed["metadata"]["name"], "opendatahub");
    }

    #[test]
    fn test_pod_running_matches_substring_and_started() {
        let pods = serde_json::json!({
            "items": [{
                "metadata": {"name": "opendatahub-operator-controller-manager-7f9d-x2k"},
                "status": {"containerStatuses": [{"started": true}]}
            }]
        });
        assert!(pod_running(&pods, "opendatahub-operator-controller-manager"));
        assert!(!pod_running(&pods, "some-other-operator"));
    }

    #[test]
    fn test_pod_not_running_when_containers_not_started() {
        let pods = serde_json::json!({
            "items": [{
                "metadata": {"name": "opendatahub-operator-controller-manager-7f9d-x2k"},
                "status": {"containerStatuses": [{"started": false}]}
            }]
        });
        assert!(!pod_running(&pods, "opendatahub-operator-controller-manager"));
    }

    #[test]
    fn test_pod_running_empty_list() {
        let pods = serde_json::json!({"items": []});
        assert!(!pod_running(&pods, "anything"));
    }
}
