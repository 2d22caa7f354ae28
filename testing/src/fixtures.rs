use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use errors::StoreError;
use parking_lot::Mutex;
use rc_core::{ChangeListener, ConfigStore, LayerKey};

static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

pub fn unique_id(prefix: &str) -> String {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}", prefix, id)
}

/// In-memory configuration store.
///
/// Absent sources fetch as an empty payload, matching a real store.
#[derive(Default)]
pub struct InMemoryConfigStore {
    payloads: DashMap<LayerKey, String>,
    failures: DashMap<LayerKey, StoreError>,
    fetch_counts: DashMap<LayerKey, usize>,
    listeners: DashMap<LayerKey, Vec<Arc<dyn ChangeListener>>>,
    subscribe_calls: AtomicUsize,
    fail_subscriptions: AtomicBool,
    unhealthy: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(self, source_id: &str, group: &str, content: &str) -> Self {
        self.set_payload(source_id, group, content);
        self
    }

    pub fn set_payload(&self, source_id: &str, group: &str, content: &str) {
        self.payloads
            .insert(LayerKey::new(source_id, group), content.to_string());
    }

    /// Makes every fetch of the key fail with `error`.
    pub fn fail_fetch(&self, source_id: &str, group: &str, error: StoreError) {
        self.failures.insert(LayerKey::new(source_id, group), error);
    }

    pub fn clear_failure(&self, source_id: &str, group: &str) {
        self.failures.remove(&LayerKey::new(source_id, group));
    }

    /// Delays every fetch by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn fail_subscriptions(&self, fail: bool) {
        self.fail_subscriptions.store(fail, Ordering::SeqCst);
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.unhealthy.store(!healthy, Ordering::SeqCst);
    }

    pub fn fetch_count(&self, source_id: &str, group: &str) -> usize {
        self.fetch_counts
            .get(&LayerKey::new(source_id, group))
            .map(|count| *count)
            .unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetch_counts.iter().map(|entry| *entry.value()).sum()
    }

    /// Number of `subscribe` calls, including failed ones.
    pub fn subscribe_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }

    /// Keys with at least one registered listener, sorted.
    pub fn subscribed_keys(&self) -> Vec<LayerKey> {
        let mut keys: Vec<_> = self.listeners.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Stores `content` and notifies every listener registered for the key.
    ///
    /// Returns the number of listeners notified.
    pub fn publish(&self, source_id: &str, group: &str, content: &str) -> usize {
        self.set_payload(source_id, group, content);

        // Clone out of the map so no shard lock is held during callbacks.
        let listeners = self
            .listeners
            .get(&LayerKey::new(source_id, group))
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        for listener in &listeners {
            listener.receive(source_id, group, content);
        }
        listeners.len()
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn fetch(&self, key: &LayerKey, _timeout: Duration) -> Result<String, StoreError> {
        *self.fetch_counts.entry(key.clone()).or_insert(0) += 1;

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.failures.get(key) {
            return Err(error.value().clone());
        }

        Ok(self
            .payloads
            .get(key)
            .map(|payload| payload.value().clone())
            .unwrap_or_default())
    }

    async fn subscribe(
        &self,
        key: &LayerKey,
        listener: Arc<dyn ChangeListener>,
    ) -> Result<(), StoreError> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_subscriptions.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: format!("subscription rejected for {}", key),
            });
        }

        tracing::debug!(%key, "registered test listener");
        self.listeners.entry(key.clone()).or_default().push(listener);
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        !self.unhealthy.load(Ordering::SeqCst)
    }
}
