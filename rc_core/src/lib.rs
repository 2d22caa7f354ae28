//! # Stratus Core
//!
//! Shared types and traits for the remote configuration client.
//!
//! This crate provides:
//! - The canonical layer identity (`LayerKey`) and layer/view types
//! - Refresh audit and signal types
//! - The seams to external collaborators: `ConfigStore`, `ChangeListener`,
//!   `ConfigParser`

pub mod traits;
pub mod types;

pub use traits::{ChangeListener, ConfigParser, ConfigStore};
pub use types::{
    CompositeView, ConfigLayer, DEFAULT_GROUP, HostEnvironment, LayerKey, PropertyGroup,
    REFRESH_EVENT_LABEL, RefreshEvent, RefreshRecord,
};
