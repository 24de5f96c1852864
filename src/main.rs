//! TrustyAI CI Cluster Setup CLI

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use trustyai_setup::commands::setup::{self, SetupOptions};
use trustyai_setup::log_info;
use trustyai_setup::utils::{dryrun, logger};

#[derive(Parser, Debug)]
#[command(name = "trustyai-setup")]
#[command(author, version, about = "TrustyAI CI Cluster Setup", long_about = None)]
struct Cli {
    /// URL of the TrustyAI manifests tarball (defaults to the main branch)
    #[arg(long = "trustyai_manifests_url", value_name = "URL")]
    trustyai_manifests_url: Option<String>,

    /// Install the prerequisite operators (when absent, they are assumed to
    /// be installed already)
    #[arg(long = "install_operators")]
    install_operators: bool,

    /// Install the DataScienceCluster (when absent, it is assumed to exist
    /// already)
    #[arg(long = "install_dsc")]
    install_dsc: bool,

    /// Directory for run artifacts
    #[arg(long = "artifact_dir", value_name = "DIR")]
    artifact_dir: Option<PathBuf>,

    /// Path to the operator config YAML (built-in list when absent)
    #[arg(long, value_name = "PATH")]
    operator_config: Option<PathBuf>,

    /// Path to kubeconfig file
    #[arg(short, long, env = "KUBECONFIG")]
    kubeconfig: Option<PathBuf>,

    /// Verbose output (can be used multiple times: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Dry-run mode: show what would be done without touching the cluster
    #[arg(long)]
    dry_run: bool,

    /// Generate shell completion scripts and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "trustyai-setup", &mut io::stdout());
        return;
    }

    logger::init(cli.verbose);

    if cli.dry_run {
        dryrun::set_dry_run(true);
        log_info!("DRY RUN MODE: No changes will be made");
    }

    let options = SetupOptions {
        manifests_url: cli.trustyai_manifests_url,
        install_operators: cli.install_operators,
        install_dsc: cli.install_dsc,
        artifact_dir: cli.artifact_dir,
        operator_config: cli.operator_config,
        kubeconfig: cli.kubeconfig,
    };

    if let Err(e) = setup::run(options) {
        e.display();
        std::process::exit(e.exit_code());
    }
}
