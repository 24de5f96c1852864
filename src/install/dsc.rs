//! DSCInitialization and DataScienceCluster installation

use crate::k8s::oc;
use crate::manifests::ManifestBundle;
use anyhow::{Context, Result, anyhow};
use std::path::Path;

const DSCI_CRD: &str = "dscinitializations.dscinitialization.opendatahub.io";
const DSC_CRD: &str = "datascienceclusters.datasciencecluster.opendatahub.io";

/// Install the default DSCInitialization
pub fn install_dsci(bundle: &ManifestBundle, kubeconfig: Option<&Path>) -> Result<()> {
    crate::utils::header("Installing DSCI");

    require_crd(DSCI_CRD, kubeconfig)?;

    if oc::resource_exists(&["dscinitialization", "default-dsci"], kubeconfig) {
        crate::log_info!("DSCInitialization default-dsci already exists, skipping");
        return Ok(());
    }

    oc::create_yaml(&bundle.dsci, kubeconfig).context("Failed to create DSCInitialization")?;

    crate::log_info!("DSCInitialization created");
    Ok(())
}

/// Install a DataScienceCluster pointing at the resolved manifests tarball
pub fn install_datascience_cluster(
    bundle: &ManifestBundle,
    kubeconfig: Option<&Path>,
) -> Result<()> {
    crate::utils::header("Installing Datascience Cluster");

    require_crd(DSC_CRD, kubeconfig)?;

    crate::log_info!("Using manifests from {}", bundle.manifests_url);

    let rendered = bundle.rendered_dsc();
    oc::create_yaml(&rendered, kubeconfig).context("Failed to create DataScienceCluster")?;

    crate::log_info!("DataScienceCluster created");
    Ok(())
}

/// The DSC API only exists once the Open Data Hub operator is installed, so a
/// missing CRD means the prerequisite operators are not ready
fn require_crd(crd: &str, kubeconfig: Option<&Path>) -> Result<()> {
    if oc::resource_exists(&["crd", crd], kubeconfig) {
        return Ok(());
    }

    Err(anyhow!(
        "CRD {} not found: prerequisite operators are not installed or not ready. \
         Run with --install_operators, or wait for the Open Data Hub operator",
        crd
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crd_names() {
        // The group suffix is what the operator registers; a typo here fails
        // every run with a confusing not-ready message
        assert!(DSCI_CRD.ends_with("dscinitialization.opendatahub.io"));
        assert!(DSC_CRD.ends_with("datasciencecluster.opendatahub.io"));
    }
}
