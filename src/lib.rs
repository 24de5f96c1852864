//! trustyai-setup - CI cluster preparation for the TrustyAI test suite
//!
//! Prepares an OpenShift cluster in a fixed sequence: resolve the TrustyAI
//! manifests tarball, optionally install the prerequisite operators via OLM,
//! optionally install the DSCInitialization and DataScienceCluster custom
//! resources, and write run artifacts for CI.

pub mod artifacts;
pub mod commands;
pub mod config;
pub mod install;
pub mod k8s;
pub mod manifests;
pub mod utils;
