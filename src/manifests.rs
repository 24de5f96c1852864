//! Manifest bundle resolution
//!
//! The manifests tarball is never extracted locally: its URL is rendered into
//! the DataScienceCluster's devFlags and fetched on-cluster by the operator.
//! Resolution here means probing that the URL serves a gzip tarball and
//! loading the DSCI/DSC manifests that will be applied.

use anyhow::{Context, Result, anyhow};
use std::path::Path;

/// Tarball of the trustyai-service-operator main branch
pub const DEFAULT_MANIFESTS_URL: &str =
    "https://github.com/trustyai-explainability/trustyai-service-operator/tarball/main";

/// Placeholder in the DSC template replaced by the manifests URL
pub const REPO_PLACEHOLDER: &str = "TRUSTYAI_REPO_PLACEHOLDER";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Default DSCInitialization applied before the DataScienceCluster
const DEFAULT_DSCI_YAML: &str = r#"apiVersion: dscinitialization.opendatahub.io/v1
kind: DSCInitialization
metadata:
  name: default-dsci
spec:
  applicationsNamespace: opendatahub
  monitoring:
    managementState: Removed
    namespace: opendatahub
  serviceMesh:
    managementState: Removed
  trustedCABundle:
    customCABundle: ""
    managementState: Managed
"#;

/// Default DataScienceCluster with the TrustyAI component pointed at the
/// manifests placeholder
const DEFAULT_DSC_TEMPLATE_YAML: &str = r#"apiVersion: datasciencecluster.opendatahub.io/v1
kind: DataScienceCluster
metadata:
  name: default-dsc
spec:
  components:
    codeflare:
      managementState: Removed
    dashboard:
      managementState: Removed
    datasciencepipelines:
      managementState: Removed
    kserve:
      managementState: Managed
    kueue:
      managementState: Removed
    modelmeshserving:
      managementState: Managed
    ray:
      managementState: Removed
    trustyai:
      devFlags:
        manifests:
          - contextDir: config
            sourcePath: ""
            uri: TRUSTYAI_REPO_PLACEHOLDER
      managementState: Managed
    workbenches:
      managementState: Removed
"#;

/// A resolved manifest bundle: the validated tarball URL plus the manifests
/// the setup run will apply
#[derive(Debug, Clone)]
pub struct ManifestBundle {
    pub manifests_url: String,
    pub dsci: String,
    pub dsc_template: String,
}

impl ManifestBundle {
    /// The DSC manifest with the placeholder replaced by the manifests URL
    pub fn rendered_dsc(&self) -> String {
        render_dsc(&self.dsc_template, &self.manifests_url)
    }
}

/// Resolve a manifest bundle for the given tarball URL.
///
/// Probes the URL and checks the payload starts with the gzip magic bytes.
/// Manifest overrides are read from `manifests/dsci.yaml` and
/// `manifests/dsc_template.yaml` in the working directory when present.
pub fn resolve(url: &str) -> Result<ManifestBundle> {
    crate::log_info!("Resolving manifests tarball: {}", url);

    crate::utils::progress::with_spinner_result(
        "Probing manifests tarball",
        "manifests tarball reachable",
        || probe_tarball(url),
    )?;

    let dsci = load_override("manifests/dsci.yaml")?.unwrap_or_else(|| DEFAULT_DSCI_YAML.into());
    let dsc_template = load_override("manifests/dsc_template.yaml")?
        .unwrap_or_else(|| DEFAULT_DSC_TEMPLATE_YAML.into());

    if !dsc_template.contains(REPO_PLACEHOLDER) {
        crate::log_warn!(
            "DSC template does not contain {}; the manifests URL will not be injected",
            REPO_PLACEHOLDER
        );
    }

    Ok(ManifestBundle {
        manifests_url: url.to_string(),
        dsci,
        dsc_template,
    })
}

/// Replace the repo placeholder in a DSC template with the manifests URL
pub fn render_dsc(template: &str, manifests_url: &str) -> String {
    template.replace(REPO_PLACEHOLDER, manifests_url)
}

/// Check the URL is reachable and serves a gzip tarball.
///
/// Only the magic bytes are read; the tarball itself is consumed on-cluster,
/// so the body is never buffered here.
fn probe_tarball(url: &str) -> Result<()> {
    use std::io::Read;

    let client = reqwest::blocking::Client::new();
    let mut response = client
        .get(url)
        .header("User-Agent", "trustyai-setup")
        .send()
        .with_context(|| format!("Manifests URL unreachable: {}", url))?
        .error_for_status()
        .with_context(|| format!("Manifests URL returned an error status: {}", url))?;

    let mut magic = [0u8; GZIP_MAGIC.len()];
    response
        .read_exact(&mut magic)
        .with_context(|| format!("Manifests URL served an empty response: {}", url))?;

    if magic != GZIP_MAGIC {
        return Err(anyhow!("Manifests URL does not serve a gzip tarball: {}", url));
    }

    crate::log_info!("Manifests tarball resolved");
    Ok(())
}

fn load_override(path: &str) -> Result<Option<String>> {
    let path = Path::new(path);
    if !path.exists() {
        return Ok(None);
    }

    crate::log_info!("Using manifest override: {}", path.display());
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest override: {}", path.display()))?;

    Ok(Some(contents))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_dsc_replaces_placeholder() {
        let rendered = render_dsc(DEFAULT_DSC_TEMPLATE_YAML, "https://example.com/tarball/pr-42");
        assert!(rendered.contains("uri: https://example.com/tarball/pr-42"));
        assert!(!rendered.contains(REPO_PLACEHOLDER));
    }

    #[test]
    fn test_bundle_rendered_dsc() {
        let bundle = ManifestBundle {
            manifests_url: DEFAULT_MANIFESTS_URL.to_string(),
            dsci: DEFAULT_DSCI_YAML.to_string(),
            dsc_template: DEFAULT_DSC_TEMPLATE_YAML.to_string(),
        };
        assert!(bundle.rendered_dsc().contains(DEFAULT_MANIFESTS_URL));
    }

    #[test]
    fn test_default_manifests_are_valid_yaml() {
        let dsci: serde_yaml::Value = serde_yaml::from_str(DEFAULT_DSCI_YAML).unwrap();
        assert_eq!(dsci["kind"], "DSCInitialization");

        let dsc: serde_yaml::Value = serde_yaml::from_str(DEFAULT_DSC_TEMPLATE_YAML).unwrap();
        assert_eq!(dsc["kind"], "DataScienceCluster");
        assert_eq!(
            dsc["spec"]["components"]["trustyai"]["managementState"],
            "Managed"
        );
    }

    /// Serve a single HTTP response on an ephemeral port and return its URL.
    fn serve_once(status_line: &str, content_length: u64, body: &[u8]) -> String {
        use std::io::{BufRead, BufReader, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "{}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status_line, content_length
        );
        let body = body.to_vec();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                // Drain the request headers before responding; the client
                // treats a response that arrives mid-request as a protocol
                // error
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut line = String::new();
                while reader.read_line(&mut line).is_ok() && line != "\r\n" {
                    line.clear();
                }
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.write_all(&body);
            }
        });
        format!("http://{}/manifests.tar.gz", addr)
    }

    #[test]
    fn test_probe_accepts_gzip_payload() {
        let payload = [0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00];
        let url = serve_once("HTTP/1.1 200 OK", payload.len() as u64, &payload);
        assert!(probe_tarball(&url).is_ok());
    }

    #[test]
    fn test_probe_rejects_html_payload() {
        let body = b"<html>Not Found</html>";
        let url = serve_once("HTTP/1.1 200 OK", body.len() as u64, body);
        let err = probe_tarball(&url).unwrap_err();
        assert!(err.to_string().contains("gzip tarball"));
    }

    #[test]
    fn test_probe_reads_only_a_prefix_of_large_bodies() {
        // Content-Length claims 8 GB but the server only ever writes the
        // magic bytes; the probe must succeed without draining the body
        let url = serve_once("HTTP/1.1 200 OK", 8_000_000_000, &GZIP_MAGIC);
        assert!(probe_tarball(&url).is_ok());
    }

    #[test]
    fn test_probe_error_status() {
        let url = serve_once("HTTP/1.1 404 Not Found", 0, b"");
        let err = probe_tarball(&url).unwrap_err();
        assert!(err.to_string().contains("error status"));
    }

    #[test]
    fn test_probe_unreachable_url() {
        let result = probe_tarball("http://127.0.0.1:1/manifests.tar.gz");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("unreachable"));
    }
}
