use crate::config::{BuildConfig, OwnerResolution};
use crate::error::Result;
use crate::policy::{NetworkPolicy, PolicyPeer};
use crate::registry::ServiceRegistry;
use crate::service::{ExternalService, ServiceId};
use crate::source::{DocumentStream, is_empty_document};
use tracing::{debug, warn};

/// Counters for one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Documents read from the stream, explicit empty ones (`---`) included.
    pub documents: usize,
    /// Documents turned into services.
    pub ingested: usize,
    /// Documents rejected as non-conforming.
    pub skipped: usize,
    /// Egress peers dropped because they are addressed by `ipBlock`.
    pub ip_block_peers: usize,
}

/// Outcome of ingesting one generic document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingested {
    /// The document was a policy; carries its owner service.
    Policy(ServiceId),
    /// Empty document, nothing to do.
    Empty,
}

/// Builds the service registry from a sequence of NetworkPolicy documents.
pub struct ServiceGraphBuilder {
    registry: ServiceRegistry,
    owner_resolution: OwnerResolution,
    stats: IngestStats,
}

impl ServiceGraphBuilder {
    pub fn new() -> Self {
        Self {
            registry: ServiceRegistry::new(),
            owner_resolution: OwnerResolution::default(),
            stats: IngestStats::default(),
        }
    }

    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new().with_owner_resolution(config.owner_resolution)
    }

    pub fn with_owner_resolution(mut self, owner_resolution: OwnerResolution) -> Self {
        self.owner_resolution = owner_resolution;
        self
    }

    /// Ingest every document of a YAML stream, in order.
    ///
    /// Non-conforming documents are logged and skipped. A syntax error stops
    /// the stream and is returned; whatever was ingested before it stays in the
    /// registry.
    pub fn ingest_yaml(&mut self, text: &str) -> Result<IngestStats> {
        let before = self.stats;
        for item in DocumentStream::new(text) {
            let (position, value) = item?;
            match self.ingest_value(position, value) {
                Ok(_) => {}
                Err(e) if e.is_resource_level() => {
                    warn!(document = position, error = %e, "Not a k8s resource, skipping");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(IngestStats {
            documents: self.stats.documents - before.documents,
            ingested: self.stats.ingested - before.ingested,
            skipped: self.stats.skipped - before.skipped,
            ip_block_peers: self.stats.ip_block_peers - before.ip_block_peers,
        })
    }

    /// Validate one generic document and ingest it as a policy.
    pub fn ingest_value(&mut self, position: usize, value: serde_yaml::Value) -> Result<Ingested> {
        self.stats.documents += 1;
        if is_empty_document(&value) {
            debug!(document = position, "Empty document");
            return Ok(Ingested::Empty);
        }
        match NetworkPolicy::from_value(position, value) {
            Ok(policy) => Ok(Ingested::Policy(self.ingest_policy(&policy))),
            Err(e) => {
                self.stats.skipped += 1;
                Err(e)
            }
        }
    }

    /// Register the policy's own selector and its ingress/egress peers.
    pub fn ingest_policy(&mut self, policy: &NetworkPolicy) -> ServiceId {
        let namespace = policy.namespace().to_owned();
        let labels = policy.pod_labels();

        let owner = match self.owner_resolution {
            OwnerResolution::Replace => self.registry.replace(Some(namespace.clone()), labels),
            OwnerResolution::Merge => self.registry.get_or_create(Some(namespace.clone()), labels),
        };
        debug!(
            policy = policy.name().unwrap_or(""),
            owner = %self.registry.service(owner).identity,
            "Ingesting policy"
        );

        for rule in &policy.spec.ingress {
            for peer in &rule.from {
                let peer_id = self.resolve_peer(peer, &namespace);
                self.registry.add_ingress(owner, peer_id);
            }
        }

        for rule in &policy.spec.egress {
            for peer in &rule.to {
                if peer.has_ip_block() {
                    match peer.ip_block().map(|block| ExternalService::from(&block)) {
                        Some(external) => debug!(cidr = %external.cidr, "Skipping ipBlock egress peer"),
                        None => debug!("Skipping ipBlock egress peer without cidr"),
                    }
                    self.stats.ip_block_peers += 1;
                    continue;
                }
                let peer_id = self.resolve_peer(peer, &namespace);
                self.registry.add_egress(owner, peer_id);
            }
        }

        self.stats.ingested += 1;
        owner
    }

    fn resolve_peer(&mut self, peer: &PolicyPeer, owner_namespace: &str) -> ServiceId {
        let namespace = peer.resolve_namespace_name(Some(owner_namespace));
        self.registry.get_or_create(namespace, peer.pod_labels())
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Totals over everything ingested so far.
    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    /// Finish the build pass and hand over the registry.
    pub fn finish(self) -> ServiceRegistry {
        self.registry
    }
}

impl Default for ServiceGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
