//! # Source Cache
//!
//! Concurrent map from `LayerKey` to the most recently fetched layer.
//! Entries are inserted once and only swapped on an explicit reload.

use std::sync::Arc;

use dashmap::DashMap;
use rc_core::{ConfigLayer, LayerKey};

#[derive(Debug, Default)]
pub struct SourceCache {
    layers: DashMap<LayerKey, Arc<ConfigLayer>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self {
            layers: DashMap::new(),
        }
    }

    /// Stores `layer` unless its key is already present.
    ///
    /// Returns the cached entry, which is `layer` itself only for the first
    /// writer.
    pub fn put_if_absent(&self, layer: impl Into<Arc<ConfigLayer>>) -> Arc<ConfigLayer> {
        let layer = layer.into();
        self.layers
            .entry(layer.key().clone())
            .or_insert(layer)
            .value()
            .clone()
    }

    /// Swaps the content of the slot for `layer`'s key.
    pub fn replace(&self, layer: impl Into<Arc<ConfigLayer>>) -> Arc<ConfigLayer> {
        let layer = layer.into();
        self.layers.insert(layer.key().clone(), layer.clone());
        layer
    }

    pub fn get(&self, key: &LayerKey) -> Option<Arc<ConfigLayer>> {
        self.layers.get(key).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, key: &LayerKey) -> bool {
        self.layers.contains_key(key)
    }

    /// Point-in-time snapshot, ordered by key.
    pub fn list_all(&self) -> Vec<Arc<ConfigLayer>> {
        let mut layers: Vec<_> = self
            .layers
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        layers.sort_by(|a, b| a.key().cmp(b.key()));
        layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_core::{DEFAULT_GROUP, PropertyGroup};

    fn layer(source_id: &str, value: &str) -> ConfigLayer {
        let mut group = PropertyGroup::new(source_id);
        group.insert("value", value);
        ConfigLayer::new(LayerKey::new(source_id, DEFAULT_GROUP), vec![group], false)
    }

    #[test]
    fn test_put_if_absent_first_writer_wins() {
        let cache = SourceCache::new();
        let first = cache.put_if_absent(layer("app", "1"));
        let second = cache.put_if_absent(layer("app", "2"));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.get_property("value"), Some("1"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_replace_swaps_content() {
        let cache = SourceCache::new();
        cache.put_if_absent(layer("app", "1"));
        cache.replace(layer("app", "2"));

        let key = LayerKey::new("app", DEFAULT_GROUP);
        assert_eq!(cache.get(&key).unwrap().get_property("value"), Some("2"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_same_identifier_different_group_are_distinct() {
        let cache = SourceCache::new();
        cache.put_if_absent(layer("app", "1"));
        cache.put_if_absent(ConfigLayer::empty(LayerKey::new("app", "OTHER"), false));

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&LayerKey::new("app", "OTHER")));
        assert!(cache.get(&LayerKey::new("app", "MISSING")).is_none());
    }

    #[test]
    fn test_list_all_is_snapshot() {
        let cache = SourceCache::new();
        cache.put_if_absent(layer("b", "1"));
        cache.put_if_absent(layer("a", "1"));

        let snapshot = cache.list_all();
        cache.put_if_absent(layer("c", "1"));

        let ids: Vec<_> = snapshot.iter().map(|l| l.source_id().to_string()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(cache.len(), 3);
    }
}
