//! Shared state connecting resolution and refresh.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::cache::SourceCache;

/// Process-wide count of processed change notifications.
///
/// Cloning yields another handle to the same counter.
#[derive(Debug, Clone, Default)]
pub struct RefreshCounter {
    count: Arc<AtomicU64>,
}

impl RefreshCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) -> u64 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn get(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    /// True once at least one change notification has been processed.
    pub fn has_refreshed(&self) -> bool {
        self.get() > 0
    }
}

/// Owns the source cache and the refresh counter for one application
/// context.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    cache: SourceCache,
    refresh_count: RefreshCounter,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }

    pub fn refresh_count(&self) -> &RefreshCounter {
        &self.refresh_count
    }
}
