//! # Config Store Manager
//!
//! Owns the single shared `ConfigStore` client for an application. The
//! client is created lazily on first use and then shared by the resolver and
//! the refresh coordinator.

use std::sync::Arc;

use async_trait::async_trait;
use config::RemoteConfigSettings;
use errors::{ResolveError, StoreError};
use rc_core::{ConfigParser, ConfigStore};
use tokio::sync::OnceCell;

use crate::builder::LayerBuilder;
use crate::context::ResolutionContext;
use crate::locator::CompositeResolver;
use crate::parser::FormatParser;

/// Creates store clients from bootstrap settings.
#[async_trait]
pub trait ConfigStoreFactory: Send + Sync {
    async fn create(
        &self,
        settings: &RemoteConfigSettings,
    ) -> Result<Arc<dyn ConfigStore>, StoreError>;
}

pub struct ConfigStoreManager {
    settings: RemoteConfigSettings,
    factory: Arc<dyn ConfigStoreFactory>,
    store: OnceCell<Arc<dyn ConfigStore>>,
}

impl ConfigStoreManager {
    pub fn new(settings: RemoteConfigSettings, factory: Arc<dyn ConfigStoreFactory>) -> Self {
        Self {
            settings,
            factory,
            store: OnceCell::new(),
        }
    }

    pub fn settings(&self) -> &RemoteConfigSettings {
        &self.settings
    }

    pub fn is_initialized(&self) -> bool {
        self.store.initialized()
    }

    /// Returns the shared client, creating it on first call.
    ///
    /// # M-CANONICAL-DOCS
    ///
    /// ## Purpose
    /// Concurrent first callers race on a single initialization; exactly one
    /// client is created per manager.
    ///
    /// ## Errors
    /// `ResolveError::ConnectionFailure` when the factory fails. A failed
    /// attempt is not cached, so a later call tries again.
    pub async fn store(&self) -> Result<Arc<dyn ConfigStore>, ResolveError> {
        self.store
            .get_or_try_init(|| async {
                tracing::info!(
                    server_addr = %self.settings.server_addr,
                    "creating configuration store client"
                );
                self.factory.create(&self.settings).await.map_err(|e| {
                    tracing::error!(
                        server_addr = %self.settings.server_addr,
                        error = %e,
                        "cannot connect to configuration store"
                    );
                    ResolveError::ConnectionFailure {
                        server_addr: self.settings.server_addr.clone(),
                        reason: e.to_string(),
                    }
                })
            })
            .await
            .cloned()
    }

    /// Builds a resolver over the shared client using the bundled parser.
    pub async fn resolver(
        &self,
        context: Arc<ResolutionContext>,
    ) -> Result<CompositeResolver, ResolveError> {
        self.resolver_with_parser(context, Arc::new(FormatParser::new()))
            .await
    }

    pub async fn resolver_with_parser(
        &self,
        context: Arc<ResolutionContext>,
        parser: Arc<dyn ConfigParser>,
    ) -> Result<CompositeResolver, ResolveError> {
        let store = self.store().await?;
        Ok(CompositeResolver::new(LayerBuilder::new(
            store,
            parser,
            context,
            self.settings.timeout(),
        )))
    }
}
