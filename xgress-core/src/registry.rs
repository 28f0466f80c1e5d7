use crate::identity::canonical_identity;
use crate::labels::Labels;
use crate::service::{Service, ServiceId};
use std::collections::HashMap;
use tracing::debug;

/// Identity → Service store for one build pass.
///
/// Services live in an append-only arena and are referenced by [`ServiceId`].
/// The registry itself is an ordered list of slots over that arena, keyed by
/// identity. Replacing an entry points its slot at a fresh service; the old one
/// stays in the arena so handles already held in other services' ingress/egress
/// lists keep resolving to it.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    /// Every service ever created, including replaced ones.
    arena: Vec<Service>,

    /// Registry entries in first-insertion order.
    slots: Vec<ServiceId>,

    /// Identity → position in `slots`.
    index: HashMap<String, usize>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the service registered under `identity`.
    pub fn get(&self, identity: &str) -> Option<ServiceId> {
        self.index.get(identity).map(|&slot| self.slots[slot])
    }

    /// Return the service registered for this selector, creating it if absent.
    pub fn get_or_create(&mut self, namespace: Option<String>, labels: Labels) -> ServiceId {
        let identity = canonical_identity(namespace.as_deref(), &labels);
        if let Some(id) = self.get(&identity) {
            return id;
        }
        let id = self.alloc(Service::new(namespace, labels));
        self.index.insert(identity, self.slots.len());
        self.slots.push(id);
        id
    }

    /// Create a new service for this selector and register it, overwriting any
    /// entry with the same identity. The slot keeps its original position.
    pub fn replace(&mut self, namespace: Option<String>, labels: Labels) -> ServiceId {
        let service = Service::new(namespace, labels);
        let identity = service.identity.clone();
        let id = self.alloc(service);
        match self.index.get(&identity) {
            Some(&slot) => {
                debug!(identity = %identity, previous = self.slots[slot].index(), "Registry entry replaced");
                self.slots[slot] = id;
            }
            None => {
                self.index.insert(identity, self.slots.len());
                self.slots.push(id);
            }
        }
        id
    }

    /// Resolve a handle. Handles are only ever issued by this registry.
    pub fn service(&self, id: ServiceId) -> &Service {
        &self.arena[id.0]
    }

    pub fn add_ingress(&mut self, owner: ServiceId, peer: ServiceId) {
        self.arena[owner.0].ingress.push(peer);
    }

    pub fn add_egress(&mut self, owner: ServiceId, peer: ServiceId) {
        self.arena[owner.0].egress.push(peer);
    }

    /// Registered services in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (ServiceId, &Service)> {
        self.slots.iter().map(|&id| (id, &self.arena[id.0]))
    }

    /// Number of registered identities.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of services created, including those no longer registered.
    pub fn service_count(&self) -> usize {
        self.arena.len()
    }

    fn alloc(&mut self, service: Service) -> ServiceId {
        let id = ServiceId(self.arena.len());
        self.arena.push(service);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs.iter().copied().collect()
    }

    #[test]
    fn get_or_create_reuses_existing_entry() {
        let mut reg = ServiceRegistry::new();
        let a = reg.get_or_create(Some("ns1".into()), labels(&[("app", "a")]));
        let again = reg.get_or_create(Some("ns1".into()), labels(&[("app", "a")]));
        assert_eq!(a, again);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.service_count(), 1);
    }

    #[test]
    fn different_namespace_is_different_entry() {
        let mut reg = ServiceRegistry::new();
        let a = reg.get_or_create(Some("ns1".into()), labels(&[("app", "a")]));
        let b = reg.get_or_create(None, labels(&[("app", "a")]));
        assert_ne!(a, b);
        assert_eq!(reg.service(b).identity, "*/app=a");
    }

    #[test]
    fn replace_overwrites_in_place() {
        let mut reg = ServiceRegistry::new();
        let first = reg.get_or_create(Some("ns1".into()), labels(&[("app", "a")]));
        reg.get_or_create(Some("ns1".into()), labels(&[("app", "b")]));
        let owner = reg.replace(Some("ns1".into()), labels(&[("app", "a")]));

        assert_ne!(first, owner);
        assert_eq!(reg.get("ns1/app=a"), Some(owner));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.service_count(), 3);

        let order: Vec<_> = reg.iter().map(|(_, s)| s.identity.as_str()).collect();
        assert_eq!(order, vec!["ns1/app=a", "ns1/app=b"]);
        // The replaced service is still resolvable through its old handle.
        assert_eq!(reg.service(first).identity, "ns1/app=a");
    }

    #[test]
    fn replace_registers_new_identity() {
        let mut reg = ServiceRegistry::new();
        let id = reg.replace(Some("ns1".into()), Labels::new());
        assert_eq!(reg.get("ns1/"), Some(id));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn relationships_are_appended_in_order() {
        let mut reg = ServiceRegistry::new();
        let a = reg.get_or_create(Some("ns".into()), labels(&[("app", "a")]));
        let b = reg.get_or_create(Some("ns".into()), labels(&[("app", "b")]));
        let c = reg.get_or_create(Some("ns".into()), labels(&[("app", "c")]));
        reg.add_egress(a, c);
        reg.add_egress(a, b);
        reg.add_ingress(a, b);
        assert_eq!(reg.service(a).egress, vec![c, b]);
        assert_eq!(reg.service(a).ingress, vec![b]);
    }
}
