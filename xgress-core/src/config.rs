use crate::error::Result;
use figment::{Figment, providers::{Env, Format, Yaml}};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level xgress configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XgressConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub projection: ProjectionConfig,
}

/// Where and how the graph JSON is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub pretty: bool,
}

/// Graph building settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    pub owner_resolution: OwnerResolution,
}

/// How a policy's own selector is registered when its identity already exists.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OwnerResolution {
    /// Always create a fresh service and overwrite the registry entry. Peers
    /// registered earlier under the same identity are left detached.
    #[default]
    Replace,
    /// Reuse the registered service, like peers do.
    Merge,
}

/// Which services are left out of the visual graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    #[serde(default = "default_excluded_namespaces")]
    pub excluded_namespaces: Vec<String>,
    #[serde(default = "default_excluded_label_keys")]
    pub excluded_label_keys: Vec<String>,
    /// Also draw `peer -> service` links for ingress relationships.
    #[serde(default)]
    pub ingress_links: bool,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_output_path() -> PathBuf { PathBuf::from("graph.json") }
fn default_excluded_namespaces() -> Vec<String> { vec!["observability".into()] }
fn default_excluded_label_keys() -> Vec<String> { vec!["k8s-app".into()] }

// ── Impls ─────────────────────────────────────────────────────

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            pretty: false,
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            excluded_namespaces: default_excluded_namespaces(),
            excluded_label_keys: default_excluded_label_keys(),
            ingress_links: false,
        }
    }
}

impl XgressConfig {
    /// Load configuration from YAML file + `XGRESS_` env overrides
    /// (nested keys joined with `__`, e.g. `XGRESS_OUTPUT__PRETTY=true`).
    pub fn load(path: &Path) -> Result<Self> {
        let config: XgressConfig = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("XGRESS_").split("__"))
            .extract()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // ── Default values ────────────────────────────────────────────

    #[test]
    fn default_output_config_has_expected_values() {
        let cfg = OutputConfig::default();
        assert_eq!(cfg.path, PathBuf::from("graph.json"));
        assert!(!cfg.pretty);
    }

    #[test]
    fn default_projection_excludes_observability_and_k8s_app() {
        let cfg = ProjectionConfig::default();
        assert_eq!(cfg.excluded_namespaces, vec!["observability".to_string()]);
        assert_eq!(cfg.excluded_label_keys, vec!["k8s-app".to_string()]);
        assert!(!cfg.ingress_links);
    }

    #[test]
    fn default_owner_resolution_is_replace() {
        assert_eq!(BuildConfig::default().owner_resolution, OwnerResolution::Replace);
    }

    // ── OwnerResolution serde ─────────────────────────────────────

    #[test]
    fn owner_resolution_serializes_to_lowercase() {
        assert_eq!(serde_json::to_string(&OwnerResolution::Replace).unwrap(), "\"replace\"");
        assert_eq!(serde_json::to_string(&OwnerResolution::Merge).unwrap(), "\"merge\"");
    }

    // ── XgressConfig::load() ──────────────────────────────────────

    #[test]
    fn load_from_valid_yaml_overrides_defaults() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(tmpfile, "output:\n  path: out/topology.json\n  pretty: true\n").unwrap();
        let cfg = XgressConfig::load(tmpfile.path()).unwrap();
        assert_eq!(cfg.output.path, PathBuf::from("out/topology.json"));
        assert!(cfg.output.pretty);
        // Defaults still apply for unspecified sections
        assert_eq!(cfg.projection.excluded_namespaces, vec!["observability".to_string()]);
        assert_eq!(cfg.build.owner_resolution, OwnerResolution::Replace);
    }

    #[test]
    fn load_yaml_with_build_and_projection() {
        let yaml = r#"
build:
  owner_resolution: merge
projection:
  excluded_namespaces: [monitoring, logging]
  excluded_label_keys: []
  ingress_links: true
"#;
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(tmpfile, "{yaml}").unwrap();
        let cfg = XgressConfig::load(tmpfile.path()).unwrap();
        assert_eq!(cfg.build.owner_resolution, OwnerResolution::Merge);
        assert_eq!(
            cfg.projection.excluded_namespaces,
            vec!["monitoring".to_string(), "logging".to_string()]
        );
        assert!(cfg.projection.excluded_label_keys.is_empty());
        assert!(cfg.projection.ingress_links);
    }

    #[test]
    fn load_rejects_unknown_owner_resolution() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(tmpfile, "build:\n  owner_resolution: sometimes\n").unwrap();
        assert!(XgressConfig::load(tmpfile.path()).is_err());
    }
}
