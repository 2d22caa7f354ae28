//! # Configuration System
//!
//! Bootstrap configuration for the remote configuration client.
//!
//! This crate provides:
//! - Settings structures for the remote store and layer selection
//! - Environment variable loading (12-factor app principles)
//! - Configuration file loading (TOML/YAML/JSON)
//! - Configuration precedence (env > file > defaults)
//! - Configuration validation

pub mod config;
pub mod file_loader;
pub mod loader;
pub mod precedence;
pub mod validator;

pub use config::{
    ApplicationConfig, Config, ConfigEntry, RemoteConfigSettings, SUPPORTED_FILE_EXTENSIONS,
};
pub use file_loader::{
    BootstrapFormat, ConfigFileError, load_from_file, load_from_json, load_from_toml,
    load_from_yaml,
};
pub use loader::{EnvOverrides, load_env_overrides, load_from_env};
pub use precedence::{load_config, merge_configs};
pub use ::validator::Validate;
