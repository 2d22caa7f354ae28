//! # Layer Builder
//!
//! Fetches one remote source, parses it and registers the result in the
//! source cache. Fetch and parse failures never escape: the layer degrades
//! to empty and the failure is logged.

use std::sync::Arc;
use std::time::Duration;

use errors::StoreError;
use rc_core::{ConfigLayer, ConfigParser, ConfigStore, LayerKey};

use crate::context::ResolutionContext;

pub struct LayerBuilder {
    store: Arc<dyn ConfigStore>,
    parser: Arc<dyn ConfigParser>,
    context: Arc<ResolutionContext>,
    timeout: Duration,
}

impl LayerBuilder {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        parser: Arc<dyn ConfigParser>,
        context: Arc<ResolutionContext>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            parser,
            context,
            timeout,
        }
    }

    pub fn context(&self) -> &Arc<ResolutionContext> {
        &self.context
    }

    pub fn supports_format(&self, format: &str) -> bool {
        self.parser.supports(format)
    }

    /// Builds a layer and registers it in the source cache.
    ///
    /// # M-CANONICAL-DOCS
    ///
    /// ## Purpose
    /// Loads `source_id` under `group`, parsed as `format`. The result is
    /// registered with put-if-absent semantics even when it is empty, so the
    /// refresh coordinator can watch sources that do not exist yet.
    ///
    /// ## Returns
    /// The freshly built layer. When another caller registered the same key
    /// first, the cache keeps that caller's layer.
    pub async fn build(
        &self,
        source_id: &str,
        group: &str,
        format: &str,
        refreshable: bool,
    ) -> Arc<ConfigLayer> {
        let layer = Arc::new(self.load(source_id, group, format, refreshable).await);
        self.context.cache().put_if_absent(layer.clone());
        layer
    }

    /// Fetches the source again and swaps the cached slot's content.
    pub async fn reload(
        &self,
        source_id: &str,
        group: &str,
        format: &str,
        refreshable: bool,
    ) -> Arc<ConfigLayer> {
        let layer = self.load(source_id, group, format, refreshable).await;
        self.context.cache().replace(layer)
    }

    async fn load(
        &self,
        source_id: &str,
        group: &str,
        format: &str,
        refreshable: bool,
    ) -> ConfigLayer {
        let key = LayerKey::new(source_id, group);

        let content = match self.fetch(&key).await {
            Ok(content) => content,
            Err(error) => {
                metrics::counter!("remote_config.fetch.failures").increment(1);
                tracing::error!(
                    source_id,
                    group,
                    error = %error,
                    "failed to fetch remote configuration"
                );
                return ConfigLayer::empty(key, refreshable);
            }
        };

        if content.is_empty() {
            tracing::warn!(
                source_id,
                group,
                "ignoring empty remote configuration, check that the source exists"
            );
            return ConfigLayer::empty(key, refreshable);
        }

        match self.parser.parse(source_id, &content, format) {
            Ok(groups) => {
                tracing::debug!(
                    source_id,
                    group,
                    groups = groups.len(),
                    "loaded remote configuration"
                );
                ConfigLayer::new(key, groups, refreshable)
            }
            Err(error) => {
                metrics::counter!("remote_config.parse.failures").increment(1);
                tracing::error!(
                    source_id,
                    group,
                    format,
                    error = %error,
                    "failed to parse remote configuration"
                );
                ConfigLayer::empty(key, refreshable)
            }
        }
    }

    async fn fetch(&self, key: &LayerKey) -> Result<String, StoreError> {
        match tokio::time::timeout(self.timeout, self.store.fetch(key, self.timeout)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}
