//! Cluster setup run: resolve manifests, install operators, install the
//! DataScienceCluster, write artifacts

use crate::artifacts::{ArtifactWriter, RunSummary, StepRecord, StepStatus};
use crate::config::settings::{Settings, Timeouts};
use crate::config::{OperatorSpec, operators};
use crate::install;
use crate::k8s::connection;
use crate::manifests::{self, ManifestBundle};
use crate::utils::errors::{self, SetupError};
use crate::utils::{dryrun, prereqs};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Raw CLI input for a setup run
#[derive(Debug, Default)]
pub struct SetupOptions {
    pub manifests_url: Option<String>,
    pub install_operators: bool,
    pub install_dsc: bool,
    pub artifact_dir: Option<PathBuf>,
    pub operator_config: Option<PathBuf>,
    pub kubeconfig: Option<PathBuf>,
}

/// Resolved configuration for one setup run.
///
/// Built once from CLI options and the settings file, immutable afterwards.
#[derive(Debug)]
pub struct SetupConfig {
    pub manifests_url: String,
    pub install_operators: bool,
    pub install_dsc: bool,
    pub artifact_dir: PathBuf,
    pub operators: Vec<OperatorSpec>,
    pub kubeconfig: Option<PathBuf>,
}

impl SetupConfig {
    /// Resolve options against the settings file; CLI flags win
    pub fn from_options(options: SetupOptions, settings: &Settings) -> Result<Self> {
        let manifests_url = options
            .manifests_url
            .unwrap_or_else(|| settings.defaults.manifests_url.clone());

        let artifact_dir = options
            .artifact_dir
            .unwrap_or_else(|| PathBuf::from(&settings.defaults.artifact_dir));

        let operator_config = options
            .operator_config
            .or_else(|| settings.defaults.operator_config.as_ref().map(PathBuf::from));

        let operators = match operator_config {
            Some(path) => operators::load(&path)?,
            None => operators::defaults(),
        };

        let kubeconfig = options
            .kubeconfig
            .or_else(|| settings.defaults.kubeconfig_path.as_ref().map(PathBuf::from));

        Ok(Self {
            manifests_url,
            install_operators: options.install_operators,
            install_dsc: options.install_dsc,
            artifact_dir,
            operators,
            kubeconfig,
        })
    }

    /// Whether this run will touch the cluster at all
    pub fn mutates_cluster(&self) -> bool {
        self.install_operators || self.install_dsc
    }

    /// Human-readable action plan, used by dry-run output
    pub fn planned_actions(&self) -> Vec<String> {
        let mut actions = vec![format!("Resolve manifests tarball: {}", self.manifests_url)];

        if self.install_operators {
            for operator in &self.operators {
                actions.push(format!(
                    "Install operator {} ({} channel, catalog {})",
                    operator.name, operator.channel, operator.catalog_source
                ));
            }
        } else {
            actions.push("Skip operator installation (assumed present)".to_string());
        }

        if self.install_dsc {
            actions.push("Install DSCInitialization default-dsci".to_string());
            actions.push("Install DataScienceCluster default-dsc".to_string());
        } else {
            actions.push("Skip DataScienceCluster installation (assumed present)".to_string());
        }

        actions.push(format!("Write artifacts to {}", self.artifact_dir.display()));
        actions
    }
}

/// Manifests resolution behind a trait so the resolve-before-cluster-contact
/// ordering can be exercised without the network
pub trait ManifestResolver {
    fn resolve(&self, url: &str) -> Result<ManifestBundle>;
}

/// Real implementation, probing the tarball URL over HTTP
pub struct HttpResolver;

impl ManifestResolver for HttpResolver {
    fn resolve(&self, url: &str) -> Result<ManifestBundle> {
        manifests::resolve(url)
    }
}

/// Cluster-mutating steps behind a trait so the abort-on-failure sequencing
/// can be exercised without a cluster
pub trait ClusterOps {
    fn preflight(&self) -> Result<()>;
    fn install_operators(&self, operators: &[OperatorSpec]) -> Result<()>;
    fn install_data_science_cluster(&self, bundle: &ManifestBundle) -> Result<()>;
}

/// Real implementation, shelling out to oc
pub struct OcClusterOps<'a> {
    pub timeouts: &'a Timeouts,
    pub kubeconfig: Option<&'a Path>,
    pub confirm_on_limited: bool,
}

impl ClusterOps for OcClusterOps<'_> {
    fn preflight(&self) -> Result<()> {
        prereqs::check_all(&[&prereqs::oc()])?;
        connection::verify_connection(self.kubeconfig, self.confirm_on_limited)
    }

    fn install_operators(&self, operators: &[OperatorSpec]) -> Result<()> {
        install::catalog::wait_for_catalog_sources(operators, self.timeouts, self.kubeconfig)?;
        install::catalog::wait_for_package_manifests(operators, self.timeouts, self.kubeconfig)?;
        install::operators::install_operators(operators, self.timeouts, self.kubeconfig)?;
        install::operators::verify_operators_running(operators, self.timeouts, self.kubeconfig)?;
        Ok(())
    }

    fn install_data_science_cluster(&self, bundle: &ManifestBundle) -> Result<()> {
        install::dsc::install_dsci(bundle, self.kubeconfig)?;
        install::dsc::install_datascience_cluster(bundle, self.kubeconfig)?;
        Ok(())
    }
}

/// Run the full setup sequence
pub fn run(options: SetupOptions) -> Result<(), SetupError> {
    let settings = Settings::load();
    let config = SetupConfig::from_options(options, &settings).map_err(errors::config_error)?;

    if dryrun::is_dry_run() {
        dryrun::log_actions(&config.planned_actions());
        return Ok(());
    }

    let ops = OcClusterOps {
        timeouts: &settings.timeouts,
        kubeconfig: config.kubeconfig.as_deref(),
        confirm_on_limited: settings.behavior.confirm_on_limited_permissions,
    };

    let mut steps = Vec::new();
    let bundle = match run_steps(&config, &HttpResolver, &ops, &mut steps) {
        Ok(bundle) => bundle,
        Err(e) => {
            write_summary_best_effort(&config, steps);
            return Err(e);
        }
    };

    write_artifacts(&config, &bundle, steps)?;

    crate::log_info!("");
    crate::log_info!("==========================================");
    crate::log_info!("Cluster setup completed successfully!");
    crate::log_info!("==========================================");
    Ok(())
}

/// The ordered run: resolve, preflight, then the install steps.
///
/// A manifests resolution failure must abort before any cluster contact,
/// including the oc preflight.
pub fn run_steps(
    config: &SetupConfig,
    resolver: &dyn ManifestResolver,
    ops: &dyn ClusterOps,
    steps: &mut Vec<StepRecord>,
) -> Result<ManifestBundle, SetupError> {
    let started = Instant::now();
    let bundle = match resolver.resolve(&config.manifests_url) {
        Ok(bundle) => {
            steps.push(StepRecord::new(
                "resolve-manifests",
                StepStatus::Succeeded,
                started.elapsed(),
            ));
            bundle
        }
        Err(e) => {
            steps.push(StepRecord::new(
                "resolve-manifests",
                StepStatus::Failed,
                started.elapsed(),
            ));
            return Err(errors::fetch_error(e));
        }
    };

    if config.mutates_cluster() {
        ops.preflight().map_err(errors::install_error)?;
    }

    execute(config, &bundle, ops, steps)?;
    Ok(bundle)
}

/// The conditional install steps, aborting on the first failure.
///
/// A failed operator installation must never be followed by the
/// DataScienceCluster step.
pub fn execute(
    config: &SetupConfig,
    bundle: &ManifestBundle,
    ops: &dyn ClusterOps,
    steps: &mut Vec<StepRecord>,
) -> Result<(), SetupError> {
    if config.install_operators {
        let started = Instant::now();
        match ops.install_operators(&config.operators) {
            Ok(()) => steps.push(StepRecord::new(
                "install-operators",
                StepStatus::Succeeded,
                started.elapsed(),
            )),
            Err(e) => {
                steps.push(StepRecord::new(
                    "install-operators",
                    StepStatus::Failed,
                    started.elapsed(),
                ));
                steps.push(StepRecord::skipped("install-dsc"));
                return Err(errors::install_error(e));
            }
        }
    } else {
        crate::log_info!("Skipping operator installation (assumed present)");
        steps.push(StepRecord::skipped("install-operators"));
    }

    if config.install_dsc {
        let started = Instant::now();
        match ops.install_data_science_cluster(bundle) {
            Ok(()) => steps.push(StepRecord::new(
                "install-dsc",
                StepStatus::Succeeded,
                started.elapsed(),
            )),
            Err(e) => {
                steps.push(StepRecord::new(
                    "install-dsc",
                    StepStatus::Failed,
                    started.elapsed(),
                ));
                return Err(errors::install_error(e));
            }
        }
    } else {
        crate::log_info!("Skipping DataScienceCluster installation (assumed present)");
        steps.push(StepRecord::skipped("install-dsc"));
    }

    Ok(())
}

/// The final artifact step: applied manifests plus the run summary
fn write_artifacts(
    config: &SetupConfig,
    bundle: &ManifestBundle,
    mut steps: Vec<StepRecord>,
) -> Result<(), SetupError> {
    crate::utils::header("Writing Artifacts");

    let started = Instant::now();
    let writer = ArtifactWriter::new(&config.artifact_dir).map_err(errors::io_error)?;

    writer
        .write_manifest("dsci.yaml", &bundle.dsci)
        .map_err(errors::io_error)?;
    writer
        .write_manifest("dsc.yaml", &bundle.rendered_dsc())
        .map_err(errors::io_error)?;

    steps.push(StepRecord::new(
        "write-artifacts",
        StepStatus::Succeeded,
        started.elapsed(),
    ));

    writer
        .write_summary(&summary(config, steps, true))
        .map_err(errors::io_error)?;

    Ok(())
}

/// On failure, still try to leave a summary behind for CI triage
fn write_summary_best_effort(config: &SetupConfig, steps: Vec<StepRecord>) {
    let result = ArtifactWriter::new(&config.artifact_dir)
        .and_then(|writer| writer.write_summary(&summary(config, steps, false)));

    if let Err(e) = result {
        crate::log_warn!("Could not write run summary: {:#}", e);
    }
}

fn summary(config: &SetupConfig, steps: Vec<StepRecord>, succeeded: bool) -> RunSummary {
    RunSummary {
        manifests_url: config.manifests_url.clone(),
        install_operators: config.install_operators,
        install_dsc: config.install_dsc,
        succeeded,
        steps,
    }
}
