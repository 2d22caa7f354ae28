//! # Resolver
//!
//! Layered configuration resolution against a remote configuration store.
//!
//! - [`cache::SourceCache`]: fetched layers keyed by source and group
//! - [`builder::LayerBuilder`]: fetch, parse and register one layer
//! - [`locator::CompositeResolver`]: precedence-ordered composite view
//! - [`manager::ConfigStoreManager`]: lazily created shared store client

pub mod builder;
pub mod cache;
pub mod context;
pub mod locator;
pub mod manager;
pub mod parser;

pub use builder::LayerBuilder;
pub use cache::SourceCache;
pub use context::{RefreshCounter, ResolutionContext};
pub use locator::{
    COMPOSITE_NAME, CompositeResolver, EXTENSION_CONFIGS, ResolveRequest, SHARED_CONFIGS,
};
pub use manager::{ConfigStoreFactory, ConfigStoreManager};
pub use parser::FormatParser;
