use crate::labels::Labels;

/// Rendered in place of the namespace when a selector spans all namespaces.
pub const WILDCARD_NAMESPACE: &str = "*";

/// Canonical registry key for a (namespace, labels) selector:
/// `"<namespace or *>/k1=v1,k2=v2"`, labels in their given order.
pub fn canonical_identity(namespace: Option<&str>, labels: &Labels) -> String {
    let namespace = namespace
        .filter(|ns| !ns.is_empty())
        .unwrap_or(WILDCARD_NAMESPACE);

    let mut identity = String::with_capacity(namespace.len() + 1 + labels.len() * 16);
    identity.push_str(namespace);
    identity.push('/');
    for (i, (key, value)) in labels.iter().enumerate() {
        if i > 0 {
            identity.push(',');
        }
        identity.push_str(key);
        identity.push('=');
        identity.push_str(value);
    }
    identity
}
