//! Seams to the collaborators the client does not own.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use errors::{ParseError, StoreError};

use crate::types::{LayerKey, PropertyGroup};

/// Client for the remote configuration store.
///
/// Implementations own the transport. A single instance is created at
/// bootstrap and shared behind an `Arc` by every component that needs it.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Fetches the raw payload for `key`. An absent source yields an empty
    /// string rather than an error.
    async fn fetch(&self, key: &LayerKey, timeout: Duration) -> Result<String, StoreError>;

    /// Registers `listener` for change notifications on `key`.
    ///
    /// Notifications are delivered at least once, on threads owned by the
    /// implementation.
    async fn subscribe(
        &self,
        key: &LayerKey,
        listener: Arc<dyn ChangeListener>,
    ) -> Result<(), StoreError>;

    fn is_healthy(&self) -> bool {
        true
    }
}

/// Receives change notifications from a `ConfigStore`.
///
/// Must be reentrant: it may be invoked concurrently for different keys.
pub trait ChangeListener: Send + Sync {
    fn receive(&self, source_id: &str, group: &str, content: &str);
}

/// Turns a raw payload into ordered property groups.
pub trait ConfigParser: Send + Sync {
    /// `name` labels the produced groups; `format` is a file extension such
    /// as `properties` or `yaml`.
    fn parse(
        &self,
        name: &str,
        content: &str,
        format: &str,
    ) -> Result<Vec<PropertyGroup>, ParseError>;

    fn supports(&self, format: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording {
        seen: Mutex<Vec<String>>,
    }

    impl ChangeListener for Recording {
        fn receive(&self, source_id: &str, group: &str, content: &str) {
            self.seen
                .lock()
                .unwrap()
                .push(format!("{source_id}/{group}/{content}"));
        }
    }

    struct NoopStore;

    #[async_trait]
    impl ConfigStore for NoopStore {
        async fn fetch(&self, _key: &LayerKey, _timeout: Duration) -> Result<String, StoreError> {
            Ok(String::new())
        }

        async fn subscribe(
            &self,
            key: &LayerKey,
            listener: Arc<dyn ChangeListener>,
        ) -> Result<(), StoreError> {
            listener.receive(&key.source_id, &key.group, "subscribed");
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_store_default_health_and_listener_dispatch() {
        let store = NoopStore;
        assert!(store.is_healthy());

        let listener = Arc::new(Recording {
            seen: Mutex::new(Vec::new()),
        });
        store
            .subscribe(&LayerKey::new("app", "G"), listener.clone())
            .await
            .unwrap();

        assert_eq!(*listener.seen.lock().unwrap(), vec!["app/G/subscribed"]);
    }
}
