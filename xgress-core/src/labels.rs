use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Label keys consulted, in priority order, when naming a selector.
pub const NAME_LABEL_KEYS: [&str; 3] = [
    "component",
    "kubernetes.io/metadata.name",
    "app.kubernetes.io/name",
];

/// Ordered label set (`key=value` pairs).
///
/// Keeps the order in which keys appeared in the source document, since the
/// canonical identity of a selector is built in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Labels(Vec<(String, String)>);

impl Labels {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert a label. An existing key keeps its position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Labels {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut labels = Labels::new();
        for (k, v) in iter {
            labels.insert(k, v);
        }
        labels
    }
}

/// Human-readable name for a selector, taken from the first well-known label present.
pub fn derive_name(labels: &Labels) -> Option<String> {
    NAME_LABEL_KEYS
        .iter()
        .find_map(|key| labels.get(key))
        .map(str::to_owned)
}

// ── Serde ─────────────────────────────────────────────────────

impl Serialize for Labels {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Labels {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(LabelsVisitor)
    }
}

struct LabelsVisitor;

impl<'de> Visitor<'de> for LabelsVisitor {
    type Value = Labels;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a mapping of label keys to scalar values")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Labels, E> {
        Ok(Labels::new())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Labels, A::Error> {
        let mut labels = Labels::new();
        while let Some((key, value)) = access.next_entry::<ScalarString, ScalarString>()? {
            labels.insert(key.0, value.0);
        }
        Ok(labels)
    }
}

/// Scalar YAML value rendered as a string (`version: 1` reads as `"1"`).
struct ScalarString(String);

impl<'de> Deserialize<'de> for ScalarString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ScalarVisitor)
    }
}

struct ScalarVisitor;

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = ScalarString;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, number or boolean")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ScalarString, E> {
        Ok(ScalarString(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<ScalarString, E> {
        Ok(ScalarString(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<ScalarString, E> {
        Ok(ScalarString(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ScalarString, E> {
        Ok(ScalarString(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ScalarString, E> {
        Ok(ScalarString(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ScalarString, E> {
        Ok(ScalarString(v.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<ScalarString, E> {
        Ok(ScalarString(String::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_first_position_on_duplicate_key() {
        let mut labels = Labels::new();
        labels.insert("app", "a");
        labels.insert("tier", "web");
        labels.insert("app", "b");
        let pairs: Vec<_> = labels.iter().collect();
        assert_eq!(pairs, vec![("app", "b"), ("tier", "web")]);
    }

    #[test]
    fn derive_name_follows_priority_order() {
        let labels: Labels = [
            ("app.kubernetes.io/name", "by-app-name"),
            ("component", "by-component"),
        ]
        .into_iter()
        .collect();
        assert_eq!(derive_name(&labels).as_deref(), Some("by-component"));

        let labels: Labels = [
            ("app.kubernetes.io/name", "by-app-name"),
            ("kubernetes.io/metadata.name", "kube-system"),
        ]
        .into_iter()
        .collect();
        assert_eq!(derive_name(&labels).as_deref(), Some("kube-system"));
    }

    #[test]
    fn derive_name_is_none_without_known_keys() {
        let labels: Labels = [("app", "a")].into_iter().collect();
        assert!(derive_name(&labels).is_none());
        assert!(derive_name(&Labels::new()).is_none());
    }

    #[test]
    fn deserialize_preserves_document_order() {
        let labels: Labels = serde_yaml::from_str("zeta: z\nalpha: a\nmid: m\n").unwrap();
        let keys: Vec<_> = labels.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn deserialize_renders_scalars_as_strings() {
        let labels: Labels = serde_yaml::from_str("version: 2\ncanary: true\n").unwrap();
        assert_eq!(labels.get("version"), Some("2"));
        assert_eq!(labels.get("canary"), Some("true"));
    }

    #[test]
    fn serialize_as_json_object() {
        let labels: Labels = [("b", "2"), ("a", "1")].into_iter().collect();
        assert_eq!(serde_json::to_string(&labels).unwrap(), r#"{"b":"2","a":"1"}"#);
    }
}
