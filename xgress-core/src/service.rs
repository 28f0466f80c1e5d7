use crate::identity::canonical_identity;
use crate::labels::{Labels, derive_name};
use crate::policy::IpBlock;

/// Handle to a [`Service`] stored in a [`ServiceRegistry`](crate::registry::ServiceRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceId(pub(crate) usize);

impl ServiceId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One workload selector scope: every pod matching `labels` in `namespace`.
///
/// Not a Kubernetes `Service` object; the name follows the topology graph.
#[derive(Debug, Clone)]
pub struct Service {
    /// Canonical registry key, see [`canonical_identity`].
    pub identity: String,

    /// Derived from well-known labels once, at creation.
    pub display_name: Option<String>,

    /// `None` means the selector spans all namespaces.
    pub namespace: Option<String>,

    pub labels: Labels,

    /// Services allowed to send traffic to this one.
    pub ingress: Vec<ServiceId>,

    /// Services this one is allowed to send traffic to.
    pub egress: Vec<ServiceId>,
}

impl Service {
    pub fn new(namespace: Option<String>, labels: Labels) -> Self {
        Self {
            identity: canonical_identity(namespace.as_deref(), &labels),
            display_name: derive_name(&labels),
            namespace,
            labels,
            ingress: Vec::new(),
            egress: Vec::new(),
        }
    }

    /// Label used for this service in the visual graph.
    pub fn display_id(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.identity,
        }
    }
}

/// Peer addressed by CIDR rather than by label selector.
///
/// Egress rules with an `ipBlock` are not part of the graph; this type only
/// describes such a peer when it is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalService {
    pub name: Option<String>,
    pub cidr: String,
}

impl From<&IpBlock> for ExternalService {
    fn from(block: &IpBlock) -> Self {
        Self {
            name: None,
            cidr: block.cidr.clone(),
        }
    }
}
