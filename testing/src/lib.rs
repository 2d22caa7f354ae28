//! Shared test fixtures for the Stratus workspace.
//!
//! Provides an in-memory `ConfigStore` that records every call and lets a
//! test inject payloads, failures, latency and change notifications.

mod fixtures;

pub use fixtures::*;
