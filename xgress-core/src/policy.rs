//! Typed view of a Kubernetes `NetworkPolicy` document.
//!
//! Documents arrive as generic YAML trees. [`NetworkPolicy::from_value`] is the
//! ingestion boundary: it checks that the top-level resource fields are present
//! and converts the tree into the records below, so the graph builder never does
//! ad-hoc lookups on untyped data.
//!
//! Only the fields the graph needs are modelled. Anything else (ports,
//! `matchExpressions`, `policyTypes`) is accepted and ignored.

use crate::error::{Result, XgressError};
use crate::labels::{Labels, derive_name};
use serde::{Deserialize, Deserializer};

/// Namespace assumed when `metadata.namespace` is absent.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Top-level keys every resource must carry.
pub const REQUIRED_FIELDS: [&str; 4] = ["kind", "apiVersion", "metadata", "spec"];

/// `kind` and `apiVersion` are only checked for presence in
/// [`NetworkPolicy::from_value`]; their values are not read.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkPolicy {
    #[serde(deserialize_with = "null_as_default")]
    pub metadata: ObjectMeta,
    pub spec: NetworkPolicySpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectMeta {
    /// Kept as-is for diagnostics, any scalar is accepted.
    #[serde(default)]
    pub name: Option<serde_yaml::Value>,
    #[serde(default)]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPolicySpec {
    /// Pods the policy applies to. Absent means "all pods in the namespace".
    #[serde(default)]
    pub pod_selector: Option<LabelSelector>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub ingress: Vec<IngressRule>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub egress: Vec<EgressRule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    #[serde(default, deserialize_with = "null_as_default")]
    pub match_labels: Labels,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngressRule {
    #[serde(default, deserialize_with = "null_as_default")]
    pub from: Vec<PolicyPeer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EgressRule {
    #[serde(default, deserialize_with = "null_as_default")]
    pub to: Vec<PolicyPeer>,
}

/// One entry of an ingress `from` or egress `to` list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyPeer {
    #[serde(default)]
    pub pod_selector: Option<LabelSelector>,
    #[serde(default)]
    pub namespace_selector: Option<LabelSelector>,
    /// Raw `ipBlock` entry. `Some` whenever the key is present, even for
    /// `ipBlock: ~` or a block without `cidr`.
    #[serde(default, deserialize_with = "present")]
    pub ip_block: Option<serde_yaml::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IpBlock {
    pub cidr: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub except: Vec<String>,
}

impl NetworkPolicy {
    /// Convert a generic document into a policy, rejecting anything that is not
    /// shaped like a resource. `document` is the position in the stream, used
    /// for diagnostics only.
    pub fn from_value(document: usize, value: serde_yaml::Value) -> Result<Self> {
        let mapping = value.as_mapping().ok_or_else(|| XgressError::NonConforming {
            document,
            reason: "document is not a mapping".into(),
        })?;

        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| !mapping.contains_key(*field))
            .collect();
        if !missing.is_empty() {
            return Err(XgressError::NonConforming {
                document,
                reason: format!("missing required fields: {}", missing.join(", ")),
            });
        }

        serde_yaml::from_value(value).map_err(|e| XgressError::NonConforming {
            document,
            reason: e.to_string(),
        })
    }

    /// Policy name when it is a string.
    pub fn name(&self) -> Option<&str> {
        self.metadata.name.as_ref().and_then(serde_yaml::Value::as_str)
    }

    /// Namespace the policy lives in.
    pub fn namespace(&self) -> &str {
        self.metadata
            .namespace
            .as_deref()
            .unwrap_or(DEFAULT_NAMESPACE)
    }

    /// Labels selecting the pods this policy applies to.
    pub fn pod_labels(&self) -> Labels {
        self.spec
            .pod_selector
            .as_ref()
            .map(|s| s.match_labels.clone())
            .unwrap_or_default()
    }
}

impl PolicyPeer {
    /// Labels of the pods this peer selects; empty when no pod selector is given.
    pub fn pod_labels(&self) -> Labels {
        self.pod_selector
            .as_ref()
            .map(|s| s.match_labels.clone())
            .unwrap_or_default()
    }

    /// Whether the peer is addressed by CIDR.
    pub fn has_ip_block(&self) -> bool {
        self.ip_block.is_some()
    }

    /// The `ipBlock` entry as a typed block, when it carries a string `cidr`.
    pub fn ip_block(&self) -> Option<IpBlock> {
        let value = self.ip_block.as_ref()?;
        serde_yaml::from_value(value.clone()).ok()
    }

    /// Namespace this peer refers to.
    ///
    /// * no `namespaceSelector`            → `default` (the policy's own namespace)
    /// * `namespaceSelector.matchLabels`   → name derived from those labels, if any
    /// * empty `namespaceSelector`         → `None`, i.e. every namespace
    pub fn resolve_namespace_name(&self, default: Option<&str>) -> Option<String> {
        match &self.namespace_selector {
            None => default.map(str::to_owned),
            Some(selector) if !selector.match_labels.is_empty() => {
                derive_name(&selector.match_labels)
            }
            Some(_) => None,
        }
    }
}

/// Treat an explicit `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Record a key as present whatever its value, `null` included.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<serde_yaml::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_yaml::Value::deserialize(deserializer).map(Some)
}
