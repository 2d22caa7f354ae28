//! # Context Refresher
//!
//! Subscribes to change notifications for every refreshable layer in the
//! source cache and turns each notification into a refresh signal for the
//! host.
//!
//! # Lifecycle
//! `NotStarted -> Registered`. The registration pass runs once, on the first
//! call to [`ContextRefresher::on_application_ready`]. Layers cached after
//! that pass are not subscribed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use config::RemoteConfigSettings;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rc_core::{ChangeListener, ConfigStore, LayerKey, RefreshEvent};
use resolver::{RefreshCounter, ResolutionContext};
use tokio::sync::broadcast;

use crate::history::RefreshHistory;
use crate::signal::RefreshPublisher;

/// Listener registered once per layer key.
pub struct RefreshListener {
    key: LayerKey,
    counter: RefreshCounter,
    history: Arc<RefreshHistory>,
    publisher: RefreshPublisher,
}

impl RefreshListener {
    pub fn new(
        key: LayerKey,
        counter: RefreshCounter,
        history: Arc<RefreshHistory>,
        publisher: RefreshPublisher,
    ) -> Self {
        Self {
            key,
            counter,
            history,
            publisher,
        }
    }

    pub fn key(&self) -> &LayerKey {
        &self.key
    }
}

impl ChangeListener for RefreshListener {
    fn receive(&self, source_id: &str, group: &str, content: &str) {
        let refresh_count = self.counter.increment();
        self.history
            .add_refresh_record(&self.key.source_id, &self.key.group, content);
        let receivers = self.publisher.publish(RefreshEvent::default());
        metrics::counter!("remote_config.refresh.received").increment(1);

        tracing::debug!(
            source_id,
            group,
            refresh_count,
            receivers,
            "Refresh remote config: received change notification"
        );
    }
}

pub struct ContextRefresher {
    refresh_enabled: bool,
    context: Arc<ResolutionContext>,
    store: Arc<dyn ConfigStore>,
    history: Arc<RefreshHistory>,
    publisher: RefreshPublisher,
    listeners: DashMap<LayerKey, Arc<RefreshListener>>,
    ready: AtomicBool,
}

impl ContextRefresher {
    pub fn new(
        refresh_enabled: bool,
        context: Arc<ResolutionContext>,
        store: Arc<dyn ConfigStore>,
        history: Arc<RefreshHistory>,
    ) -> Self {
        Self {
            refresh_enabled,
            context,
            store,
            history,
            publisher: RefreshPublisher::new(),
            listeners: DashMap::new(),
            ready: AtomicBool::new(false),
        }
    }

    pub fn from_settings(
        settings: &RemoteConfigSettings,
        context: Arc<ResolutionContext>,
        store: Arc<dyn ConfigStore>,
    ) -> Self {
        Self::new(
            settings.refresh_enabled,
            context,
            store,
            Arc::new(RefreshHistory::new()),
        )
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<RefreshEvent> {
        self.publisher.subscribe()
    }

    pub fn context(&self) -> &Arc<ResolutionContext> {
        &self.context
    }

    pub fn store(&self) -> &Arc<dyn ConfigStore> {
        &self.store
    }

    pub fn history(&self) -> &Arc<RefreshHistory> {
        &self.history
    }

    pub fn is_refresh_enabled(&self) -> bool {
        self.refresh_enabled
    }

    pub fn is_registered(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Keys with a registered listener, sorted.
    pub fn listened_keys(&self) -> Vec<LayerKey> {
        let mut keys: Vec<_> = self.listeners.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Runs the registration pass once the host has finished starting.
    ///
    /// # M-CANONICAL-DOCS
    ///
    /// ## Purpose
    /// Subscribes one listener per refreshable cached layer. Safe to call
    /// concurrently: only the first caller performs the pass.
    ///
    /// ## Returns
    /// `true` for the call that performed registration, `false` otherwise.
    ///
    /// ## Failure Modes
    /// A failed subscription is logged and the layer keeps its last loaded
    /// values without live updates.
    pub async fn on_application_ready(&self) -> bool {
        if self
            .ready
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        if !self.refresh_enabled {
            tracing::info!("Remote configuration refresh is disabled, no listeners registered");
            return true;
        }

        for layer in self.context.cache().list_all() {
            if !layer.is_refreshable() {
                continue;
            }
            self.register_listener(layer.key()).await;
        }

        tracing::info!(
            listeners = self.listeners.len(),
            "registered remote configuration listeners"
        );
        true
    }

    async fn register_listener(&self, key: &LayerKey) {
        let listener = match self.listeners.entry(key.clone()) {
            Entry::Occupied(_) => return,
            Entry::Vacant(vacant) => {
                let listener = Arc::new(RefreshListener::new(
                    key.clone(),
                    self.context.refresh_count().clone(),
                    self.history.clone(),
                    self.publisher.clone(),
                ));
                vacant.insert(listener.clone());
                listener
            }
        };

        match self.store.subscribe(key, listener).await {
            Ok(()) => tracing::info!(
                source_id = %key.source_id,
                group = %key.group,
                "listening for remote configuration changes"
            ),
            Err(e) => tracing::warn!(
                source_id = %key.source_id,
                group = %key.group,
                error = %e,
                "failed to subscribe to remote configuration, live updates disabled for this layer"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_core::{ConfigLayer, DEFAULT_GROUP};
    use testing::InMemoryConfigStore;

    fn context_with(layers: &[(&str, bool)]) -> Arc<ResolutionContext> {
        let context = Arc::new(ResolutionContext::new());
        for (source_id, refreshable) in layers {
            context
                .cache()
                .put_if_absent(ConfigLayer::empty(
                    LayerKey::new(*source_id, DEFAULT_GROUP),
                    *refreshable,
                ));
        }
        context
    }

    fn refresher(
        store: Arc<InMemoryConfigStore>,
        context: Arc<ResolutionContext>,
    ) -> ContextRefresher {
        ContextRefresher::new(true, context, store, Arc::new(RefreshHistory::new()))
    }

    #[tokio::test]
    async fn test_registers_only_refreshable_layers() {
        let store = Arc::new(InMemoryConfigStore::new());
        let refresher = refresher(store.clone(), context_with(&[("app", true), ("shared", false)]));

        assert!(refresher.on_application_ready().await);

        assert_eq!(refresher.listened_keys(), vec![LayerKey::new("app", DEFAULT_GROUP)]);
        assert_eq!(store.subscribed_keys(), vec![LayerKey::new("app", DEFAULT_GROUP)]);
    }

    #[tokio::test]
    async fn test_second_ready_call_is_noop() {
        let store = Arc::new(InMemoryConfigStore::new());
        let refresher = refresher(store.clone(), context_with(&[("app", true)]));

        assert!(refresher.on_application_ready().await);
        assert!(!refresher.on_application_ready().await);
        assert_eq!(store.subscribe_calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ready_registers_once() {
        let store = Arc::new(InMemoryConfigStore::new());
        let refresher = Arc::new(refresher(
            store.clone(),
            context_with(&[("app", true), ("app.properties", true)]),
        ));

        let tasks: Vec<_> = (0..3)
            .map(|_| {
                let refresher = refresher.clone();
                tokio::spawn(async move { refresher.on_application_ready().await })
            })
            .collect();

        let mut performed = 0;
        for task in tasks {
            if task.await.unwrap() {
                performed += 1;
            }
        }

        assert_eq!(performed, 1);
        assert_eq!(store.subscribe_calls(), 2);
        assert_eq!(refresher.listener_count(), 2);
    }

    #[tokio::test]
    async fn test_refresh_disabled_skips_registration() {
        let store = Arc::new(InMemoryConfigStore::new());
        let refresher = ContextRefresher::new(
            false,
            context_with(&[("app", true)]),
            store.clone(),
            Arc::new(RefreshHistory::new()),
        );

        assert!(refresher.on_application_ready().await);
        assert!(refresher.is_registered());
        assert_eq!(store.subscribe_calls(), 0);
    }

    #[tokio::test]
    async fn test_subscription_failure_degrades() {
        let store = Arc::new(InMemoryConfigStore::new());
        store.fail_subscriptions(true);
        let context = context_with(&[("app", true)]);
        let refresher = refresher(store.clone(), context.clone());

        assert!(refresher.on_application_ready().await);

        assert_eq!(store.subscribe_calls(), 1);
        assert!(store.subscribed_keys().is_empty());
        assert_eq!(context.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_notification_counts_records_and_signals() {
        let store = Arc::new(InMemoryConfigStore::new());
        let context = context_with(&[("app", true)]);
        let refresher = refresher(store.clone(), context.clone());
        let mut events = refresher.subscribe_events();
        refresher.on_application_ready().await;

        assert_eq!(store.publish("app", DEFAULT_GROUP, "a=2"), 1);
        assert_eq!(store.publish("app", DEFAULT_GROUP, "a=2"), 1);

        assert_eq!(context.refresh_count().get(), 2);
        let records = refresher.history().snapshot();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source_id, "app");
        assert_eq!(records[0].fingerprint, records[1].fingerprint);
        assert_eq!(events.recv().await.unwrap(), RefreshEvent::default());
        assert_eq!(events.recv().await.unwrap(), RefreshEvent::default());
    }

    #[test]
    fn test_listener_without_receivers() {
        let history = Arc::new(RefreshHistory::new());
        let counter = RefreshCounter::new();
        let listener = RefreshListener::new(
            LayerKey::new("app", DEFAULT_GROUP),
            counter.clone(),
            history.clone(),
            RefreshPublisher::new(),
        );

        listener.receive("app", DEFAULT_GROUP, "");

        assert_eq!(counter.get(), 1);
        assert!(history.snapshot()[0].fingerprint.is_none());
        assert_eq!(listener.key().source_id, "app");
    }
}
