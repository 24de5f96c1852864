//! Prerequisite operator configuration parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Built-in operator list used when no config file is given.
///
/// The DataScienceCluster needs the Open Data Hub operator, which in turn
/// expects service mesh, serverless and authorino to be present.
const DEFAULT_OPERATORS_YAML: &str = r#"
- name: servicemeshoperator
  channel: stable
  catalogSource: redhat-operators
  namespace: openshift-operators
  version: "2.5.0"
  correspondingPods:
    - istio-operator
- name: serverless-operator
  channel: stable
  catalogSource: redhat-operators
  namespace: openshift-serverless
  version: "1.31.0"
  correspondingPods:
    - knative-openshift
- name: authorino-operator
  channel: stable
  catalogSource: community-operators
  namespace: openshift-operators
  version: "0.11.1"
  correspondingPods:
    - authorino-operator
- name: opendatahub-operator
  channel: fast
  catalogSource: community-operators
  namespace: openshift-operators
  version: "2.11.1"
  correspondingPods:
    - opendatahub-operator-controller-manager
"#;

/// One prerequisite operator to install via OLM.
///
/// Field names follow the operators config YAML
/// (`catalogSource`, `correspondingPods`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperatorSpec {
    pub name: String,
    pub channel: String,
    pub catalog_source: String,
    pub namespace: String,
    pub version: String,
    #[serde(default)]
    pub corresponding_pods: Vec<String>,
}

impl OperatorSpec {
    /// The CSV name the subscription pins: `<name>.v<version>`
    pub fn starting_csv(&self) -> String {
        format!("{}.v{}", self.name, self.version)
    }
}

/// Load the operator list from a YAML file
pub fn load(path: &Path) -> Result<Vec<OperatorSpec>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read operator config: {}", path.display()))?;

    let operators: Vec<OperatorSpec> = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse operator config: {}", path.display()))?;

    Ok(operators)
}

/// The built-in operator list
pub fn defaults() -> Vec<OperatorSpec> {
    serde_yaml::from_str(DEFAULT_OPERATORS_YAML).expect("built-in operator list must parse")
}

/// Distinct catalog sources referenced by the operator list
pub fn catalog_sources(operators: &[OperatorSpec]) -> BTreeSet<String> {
    operators
        .iter()
        .map(|o| o.catalog_source.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_operators_parse() {
        let operators = defaults();
        assert!(!operators.is_empty());

        let odh = operators
            .iter()
            .find(|o| o.name == "opendatahub-operator")
            .unwrap();
        assert_eq!(odh.catalog_source, "community-operators");
        assert_eq!(odh.channel, "fast");
        assert!(!odh.corresponding_pods.is_empty());
    }

    #[test]
    fn test_starting_csv() {
        let spec = OperatorSpec {
            name: "opendatahub-operator".to_string(),
            channel: "fast".to_string(),
            catalog_source: "community-operators".to_string(),
            namespace: "openshift-operators".to_string(),
            version: "2.11.1".to_string(),
            corresponding_pods: vec![],
        };
        assert_eq!(spec.starting_csv(), "opendatahub-operator.v2.11.1");
    }

    #[test]
    fn test_catalog_sources_deduplicated() {
        let operators = defaults();
        let sources = catalog_sources(&operators);
        assert!(sources.contains("community-operators"));
        assert!(sources.contains("redhat-operators"));
        // Several operators share a source but it appears once
        assert!(sources.len() < operators.len());
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
- name: my-operator
  channel: alpha
  catalogSource: my-catalog
  namespace: my-namespace
  version: "1.2.3"
  correspondingPods:
    - my-operator-controller
"#;
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(yaml.as_bytes()).unwrap();

        let operators = load(temp.path()).unwrap();
        assert_eq!(operators.len(), 1);
        assert_eq!(operators[0].name, "my-operator");
        assert_eq!(operators[0].starting_csv(), "my-operator.v1.2.3");
        assert_eq!(operators[0].corresponding_pods, vec!["my-operator-controller"]);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load(Path::new("/nonexistent/operators.yaml")).is_err());
    }
}
