//! Cluster connection verification

use crate::k8s::oc;
use anyhow::{Context, Result};
use std::path::Path;

/// Verify the OpenShift cluster connection before mutating anything.
///
/// Checks login, reports the server and user, and warns when the current user
/// does not look like cluster-admin (operator installation needs it).
pub fn verify_connection(kubeconfig: Option<&Path>, confirm_on_limited: bool) -> Result<()> {
    crate::log_info!("Verifying OpenShift cluster connection...");

    let current_user = oc::run_oc_output(&["whoami"], kubeconfig)
        .context("Not logged into an OpenShift cluster. Run 'oc login' first")?
        .trim()
        .to_string();

    let cluster_url = oc::run_oc_output(&["whoami", "--show-server"], kubeconfig)
        .unwrap_or_default()
        .trim()
        .to_string();

    crate::log_info!("Connected to OpenShift cluster as: {}", current_user);
    crate::log_info!("Cluster URL: {}", cluster_url);

    // Operator subscriptions and the DSC need cluster-admin
    let can_do_anything =
        oc::run_oc_output(&["auth", "can-i", "*", "*", "--all-namespaces"], kubeconfig)
            .map(|out| out.trim() == "yes")
            .unwrap_or(false);

    if !can_do_anything {
        crate::log_warn!("You may not have cluster-admin permissions");
        crate::log_warn!("Operator and DataScienceCluster installation may be rejected");

        if confirm_on_limited && !crate::utils::confirm("Continue anyway?")? {
            return Err(anyhow::anyhow!("Aborted: insufficient cluster permissions"));
        }
    }

    crate::log_info!("Cluster connection verified");
    Ok(())
}
