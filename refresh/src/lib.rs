//! # Refresh
//!
//! Live updates for remotely resolved configuration: per-layer change
//! subscriptions, a refresh signal for the host, a bounded refresh audit
//! trail and a read-only management endpoint.

pub mod endpoint;
pub mod history;
pub mod refresher;
pub mod signal;

pub use endpoint::router;
pub use history::{DEFAULT_MAX_RECORDS, RefreshHistory};
pub use refresher::{ContextRefresher, RefreshListener};
pub use signal::RefreshPublisher;
