use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Group used when neither the entry nor the settings name one.
pub const DEFAULT_GROUP: &str = "DEFAULT_GROUP";

/// Label carried by every refresh signal.
pub const REFRESH_EVENT_LABEL: &str = "Refresh remote config";

/// Canonical identity of a remote configuration source.
///
/// Every cache entry and subscription is keyed by the pair; there is no
/// lookup by bare source identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerKey {
    pub source_id: String,
    pub group: String,
}

impl LayerKey {
    pub fn new(source_id: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            group: group.into(),
        }
    }
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.source_id, self.group)
    }
}

/// Ordered key/value mapping parsed from one section of a payload.
///
/// Insertion order is preserved. Inserting an existing key replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyGroup {
    name: String,
    entries: Vec<(String, String)>,
}

impl PropertyGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One fetched and parsed unit of configuration.
///
/// Layers are immutable once built; the source cache hands them out behind
/// an `Arc`. A reload produces a new layer for the same key.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLayer {
    key: LayerKey,
    groups: Vec<PropertyGroup>,
    loaded_at: DateTime<Utc>,
    refreshable: bool,
}

impl ConfigLayer {
    pub fn new(key: LayerKey, groups: Vec<PropertyGroup>, refreshable: bool) -> Self {
        Self {
            key,
            groups,
            loaded_at: Utc::now(),
            refreshable,
        }
    }

    /// Layer with no properties, used when the remote payload is absent or
    /// could not be loaded.
    pub fn empty(key: LayerKey, refreshable: bool) -> Self {
        Self::new(key, Vec::new(), refreshable)
    }

    pub fn key(&self) -> &LayerKey {
        &self.key
    }

    pub fn source_id(&self) -> &str {
        &self.key.source_id
    }

    pub fn group(&self) -> &str {
        &self.key.group
    }

    pub fn groups(&self) -> &[PropertyGroup] {
        &self.groups
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn is_refreshable(&self) -> bool {
        self.refreshable
    }

    pub fn property_count(&self) -> usize {
        self.groups.iter().map(PropertyGroup::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.property_count() == 0
    }

    /// First value for `key` across the layer's groups, in group order.
    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.groups.iter().find_map(|group| group.get(key))
    }
}

/// Precedence-ordered aggregation of layers for one resolution pass.
///
/// Index 0 is the highest precedence layer.
#[derive(Debug, Clone, Default)]
pub struct CompositeView {
    name: String,
    layers: Vec<Arc<ConfigLayer>>,
}

impl CompositeView {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts `layer` ahead of everything added so far.
    pub fn add_first(&mut self, layer: Arc<ConfigLayer>) {
        self.layers.insert(0, layer);
    }

    pub fn layers(&self) -> &[Arc<ConfigLayer>] {
        &self.layers
    }

    pub fn layer_keys(&self) -> Vec<&LayerKey> {
        self.layers.iter().map(|layer| layer.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.layers.iter().find_map(|layer| layer.get_property(key))
    }

    /// Distinct property names, highest precedence layer first.
    pub fn property_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for group in self.layers.iter().flat_map(|layer| layer.groups()) {
            for key in group.keys() {
                if !names.contains(&key) {
                    names.push(key);
                }
            }
        }
        names
    }
}

/// One entry of the refresh audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRecord {
    pub timestamp: DateTime<Utc>,
    pub source_id: String,
    pub group: String,
    /// `None` when the notified payload was empty.
    pub fingerprint: Option<String>,
}

/// Signal emitted to the host whenever a change notification is processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshEvent {
    pub label: String,
}

impl Default for RefreshEvent {
    fn default() -> Self {
        Self {
            label: REFRESH_EVENT_LABEL.to_string(),
        }
    }
}

/// The slice of the host environment the resolver reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEnvironment {
    pub application_name: Option<String>,
    pub active_profiles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str, entries: &[(&str, &str)]) -> PropertyGroup {
        let mut group = PropertyGroup::new(name);
        for (k, v) in entries {
            group.insert(*k, *v);
        }
        group
    }

    #[test]
    fn test_layer_key_display() {
        let key = LayerKey::new("app.properties", DEFAULT_GROUP);
        assert_eq!(key.to_string(), "app.properties,DEFAULT_GROUP");
    }

    #[test]
    fn test_property_group_preserves_order_and_replaces() {
        let mut g = group("g", &[("b", "1"), ("a", "2")]);
        g.insert("b", "3");

        let entries: Vec<_> = g.iter().collect();
        assert_eq!(entries, vec![("b", "3"), ("a", "2")]);
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn test_empty_layer() {
        let layer = ConfigLayer::empty(LayerKey::new("app", DEFAULT_GROUP), true);
        assert!(layer.is_empty());
        assert_eq!(layer.property_count(), 0);
        assert!(layer.is_refreshable());
    }

    #[test]
    fn test_layer_with_only_empty_groups_is_empty() {
        let layer = ConfigLayer::new(
            LayerKey::new("app", DEFAULT_GROUP),
            vec![PropertyGroup::new("app")],
            false,
        );
        assert!(layer.is_empty());
    }

    #[test]
    fn test_composite_view_front_insertion_wins() {
        let low = ConfigLayer::new(
            LayerKey::new("shared", DEFAULT_GROUP),
            vec![group("shared", &[("port", "80"), ("host", "a")])],
            false,
        );
        let high = ConfigLayer::new(
            LayerKey::new("app", DEFAULT_GROUP),
            vec![group("app", &[("port", "8080")])],
            true,
        );

        let mut view = CompositeView::new("REMOTE");
        view.add_first(Arc::new(low));
        view.add_first(Arc::new(high));

        assert_eq!(view.get_property("port"), Some("8080"));
        assert_eq!(view.get_property("host"), Some("a"));
        assert_eq!(view.get_property("missing"), None);
        assert_eq!(view.property_names(), vec!["port", "host"]);
        assert_eq!(view.layer_keys()[0].source_id, "app");
    }

    #[test]
    fn test_refresh_record_serializes_camel_case() {
        let record = RefreshRecord {
            timestamp: Utc::now(),
            source_id: "app".to_string(),
            group: DEFAULT_GROUP.to_string(),
            fingerprint: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sourceId"], "app");
        assert!(json["fingerprint"].is_null());
    }

    #[test]
    fn test_refresh_event_default_label() {
        assert_eq!(RefreshEvent::default().label, REFRESH_EVENT_LABEL);
    }
}
