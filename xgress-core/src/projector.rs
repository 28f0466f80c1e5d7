use crate::config::ProjectionConfig;
use crate::registry::ServiceRegistry;
use crate::service::Service;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Group shared by every service whose selector spans all namespaces.
pub const WILDCARD_GROUP: u32 = 0;

/// Node of the visual graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisNode {
    pub id: String,
    pub group: u32,
}

/// Directed link of the visual graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisLink {
    pub source: String,
    pub target: String,
    pub value: u32,
}

/// The force-graph document handed to the viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisGraph {
    pub nodes: Vec<VisNode>,
    pub links: Vec<VisLink>,
}

/// Projects a finished registry into a [`VisGraph`].
#[derive(Debug, Clone, Default)]
pub struct GraphProjector {
    policy: ProjectionConfig,
}

impl GraphProjector {
    pub fn new(policy: ProjectionConfig) -> Self {
        Self { policy }
    }

    /// Whether a service is left out of the graph entirely.
    pub fn is_excluded(&self, service: &Service) -> bool {
        if let Some(ns) = &service.namespace
            && self.policy.excluded_namespaces.iter().any(|e| e == ns)
        {
            return true;
        }
        self.policy
            .excluded_label_keys
            .iter()
            .any(|key| service.labels.contains_key(key))
    }

    pub fn project(&self, registry: &ServiceRegistry) -> VisGraph {
        let mut groups = NamespaceGroups::default();
        let mut graph = VisGraph::default();
        let mut drawn: HashSet<(String, String)> = HashSet::new();

        for (_, service) in registry.iter() {
            if self.is_excluded(service) {
                debug!(identity = %service.identity, "Excluded from graph");
                continue;
            }

            let id = service.display_id().to_owned();
            graph.nodes.push(VisNode {
                id: id.clone(),
                group: groups.group_of(service.namespace.as_deref()),
            });

            for &peer_id in &service.egress {
                let peer = registry.service(peer_id);
                if self.is_excluded(peer) {
                    continue;
                }
                if self.policy.ingress_links {
                    drawn.insert((id.clone(), peer.display_id().to_owned()));
                }
                graph.links.push(link(&id, peer.display_id()));
            }
        }

        if self.policy.ingress_links {
            self.project_ingress(registry, &mut drawn, &mut graph);
        }

        debug!(nodes = graph.nodes.len(), links = graph.links.len(), "Graph projected");
        graph
    }

    /// Reverse links for ingress relationships no egress link already covers.
    fn project_ingress(
        &self,
        registry: &ServiceRegistry,
        drawn: &mut HashSet<(String, String)>,
        graph: &mut VisGraph,
    ) {
        for (_, service) in registry.iter() {
            if self.is_excluded(service) {
                continue;
            }
            let target = service.display_id();
            for &peer_id in &service.ingress {
                let peer = registry.service(peer_id);
                if self.is_excluded(peer) {
                    continue;
                }
                let key = (peer.display_id().to_owned(), target.to_owned());
                if drawn.insert(key) {
                    graph.links.push(link(peer.display_id(), target));
                }
            }
        }
    }
}

fn link(source: &str, target: &str) -> VisLink {
    VisLink {
        source: source.to_owned(),
        target: target.to_owned(),
        value: 1,
    }
}

/// Namespace → group id, handed out in order of first appearance from 1.
#[derive(Debug, Default)]
struct NamespaceGroups {
    ids: HashMap<String, u32>,
}

impl NamespaceGroups {
    fn group_of(&mut self, namespace: Option<&str>) -> u32 {
        match namespace {
            None | Some("") => WILDCARD_GROUP,
            Some(ns) => {
                let next = self.ids.len() as u32 + 1;
                *self.ids.entry(ns.to_owned()).or_insert(next)
            }
        }
    }
}
