//! Catalog source and package manifest readiness checks
//!
//! Operator subscriptions are rejected until the referenced CatalogSource is
//! registered and its PackageManifest is served, so both are polled before any
//! Subscription is created.

use crate::config::OperatorSpec;
use crate::config::settings::Timeouts;
use crate::k8s::oc;
use crate::utils::progress::PollProgress;
use anyhow::{Result, anyhow};
use std::path::Path;
use std::time::Duration;

/// Wait until every catalog source referenced by the operator list exists
pub fn wait_for_catalog_sources(
    operators: &[OperatorSpec],
    timeouts: &Timeouts,
    kubeconfig: Option<&Path>,
) -> Result<()> {
    crate::utils::header("Waiting for Catalog Sources");

    let max_attempts = attempts(timeouts.catalog_source, timeouts.recheck_interval);

    for catalog_source in crate::config::operators::catalog_sources(operators) {
        let progress = PollProgress::new(&format!("catalog source {}", catalog_source));

        let mut found = false;
        for attempt in 1..=max_attempts {
            progress.tick(attempt, max_attempts);

            let available = oc::get_json(&["catalogsources", "-A"], kubeconfig)
                .map(|list| oc::item_names(&list))
                .unwrap_or_default();

            if available.iter().any(|name| name == &catalog_source) {
                progress.finish_success();
                crate::log_info!("{} catalog found", catalog_source);
                found = true;
                break;
            }

            std::thread::sleep(Duration::from_secs(timeouts.recheck_interval));
        }

        if !found {
            progress.finish_timeout();
            return Err(anyhow!("Catalog source {} not found", catalog_source));
        }
    }

    Ok(())
}

/// Wait until each operator's package manifest is served
pub fn wait_for_package_manifests(
    operators: &[OperatorSpec],
    timeouts: &Timeouts,
    kubeconfig: Option<&Path>,
) -> Result<()> {
    crate::utils::header("Waiting for Package Manifests");

    let max_attempts = attempts(timeouts.package_manifest, timeouts.recheck_interval);

    // The listing is large, so the first check for each operator reuses the
    // previous operator's listing before re-fetching
    let mut cached_names: Option<Vec<String>> = None;

    for operator in operators {
        let progress = PollProgress::new(&format!("package manifest {}", operator.name));

        let mut found = false;
        for attempt in 1..=max_attempts {
            progress.tick(attempt, max_attempts);

            let names = if attempt == 1 && cached_names.is_some() {
                cached_names.clone().unwrap_or_default()
            } else {
                let fetched =
                    oc::get_json(&["packagemanifests", "-n", "openshift-marketplace"], kubeconfig)
                        .map(|list| oc::item_names(&list))
                        .unwrap_or_default();
                cached_names = Some(fetched.clone());
                fetched
            };

            if names.iter().any(|name| name == &operator.name) {
                progress.finish_success();
                crate::log_info!("{} package manifest found", operator.name);
                found = true;
                break;
            }

            std::thread::sleep(Duration::from_secs(timeouts.recheck_interval));
        }

        if !found {
            progress.finish_timeout();
            return Err(anyhow!("Package manifest for {} not found", operator.name));
        }
    }

    Ok(())
}

/// Number of poll attempts that fit in a wait budget
pub fn attempts(timeout_secs: u64, interval_secs: u64) -> u32 {
    (timeout_secs / interval_secs.max(1)).max(1) as u32
}
