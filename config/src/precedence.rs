//! # Configuration Precedence
//!
//! Merges bootstrap configuration from multiple sources with precedence rules.
//!
//! # Precedence Order
//! 1. Environment variables (highest priority)
//! 2. Configuration file
//! 3. Default values (lowest priority)

use std::path::Path;

use crate::config::{ApplicationConfig, Config, RemoteConfigSettings};
use crate::file_loader::load_from_file;
use crate::loader::{EnvOverrides, load_env_overrides};
use crate::validator::validate;

/// Merge configuration sources with precedence.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Merges bootstrap configuration following precedence rules:
/// environment variables > config file > defaults. A file field only wins
/// over the defaults when it differs from them. Every environment variable
/// that is set wins over the file, including one set to the default value.
///
/// ## Usage
/// ```rust,no_run
/// use config::{Config, merge_configs, load_from_file, load_env_overrides};
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let from_file = load_from_file(Path::new("bootstrap.toml"))?;
///     let from_env = load_env_overrides()?;
///
///     let _config = merge_configs(Config::default(), from_file, "file", &from_env, "env");
///     Ok(())
/// }
/// ```
///
/// ## Lists
/// Shared and extension layer lists replace the base list wholesale when the
/// file declares any entries.
pub fn merge_configs(
    defaults: Config,
    file_config: Config,
    file_source_name: &str,
    env: &EnvOverrides,
    env_source_name: &str,
) -> Config {
    let mut config = merge_with_logging(defaults, file_config, file_source_name);

    let changes = env.apply_to(&mut config);
    if !changes.is_empty() {
        tracing::info!(source = env_source_name, ?changes, "applied configuration overrides");
    }

    config
}

/// Load, merge and validate the bootstrap configuration.
///
/// `path` is optional: without a file only defaults and the environment
/// apply.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let file_config = match path {
        Some(path) => load_from_file(path)?,
        None => Config::default(),
    };
    let env = load_env_overrides()?;

    let config = merge_configs(Config::default(), file_config, "file", &env, "env");
    validate(&config)?;
    Ok(config)
}

fn merge_with_logging(mut base: Config, override_config: Config, source_name: &str) -> Config {
    let mut changes = Vec::new();

    merge_remote(&mut base.remote, override_config.remote, &mut changes);
    merge_application(&mut base.application, override_config.application, &mut changes);

    if !changes.is_empty() {
        tracing::info!(source = source_name, ?changes, "applied configuration overrides");
    }

    base
}

fn merge_remote(
    base: &mut RemoteConfigSettings,
    override_config: RemoteConfigSettings,
    changes: &mut Vec<String>,
) {
    let defaults = RemoteConfigSettings::default();

    if override_config.server_addr != defaults.server_addr
        && override_config.server_addr != base.server_addr
    {
        changes.push(format!("remote.server_addr = {}", override_config.server_addr));
        base.server_addr = override_config.server_addr;
    }
    merge_optional(
        &mut base.namespace,
        override_config.namespace,
        "remote.namespace",
        changes,
    );
    merge_optional(&mut base.prefix, override_config.prefix, "remote.prefix", changes);
    merge_optional(&mut base.name, override_config.name, "remote.name", changes);
    if override_config.group != defaults.group && override_config.group != base.group {
        changes.push(format!("remote.group = {}", override_config.group));
        base.group = override_config.group;
    }
    if override_config.file_extension != defaults.file_extension
        && override_config.file_extension != base.file_extension
    {
        changes.push(format!(
            "remote.file_extension = {}",
            override_config.file_extension
        ));
        base.file_extension = override_config.file_extension;
    }
    if override_config.timeout_ms != defaults.timeout_ms
        && override_config.timeout_ms != base.timeout_ms
    {
        changes.push(format!("remote.timeout_ms = {}", override_config.timeout_ms));
        base.timeout_ms = override_config.timeout_ms;
    }
    if override_config.refresh_enabled != defaults.refresh_enabled
        && override_config.refresh_enabled != base.refresh_enabled
    {
        changes.push(format!(
            "remote.refresh_enabled = {}",
            override_config.refresh_enabled
        ));
        base.refresh_enabled = override_config.refresh_enabled;
    }
    if override_config.ignore_empty_layers != defaults.ignore_empty_layers
        && override_config.ignore_empty_layers != base.ignore_empty_layers
    {
        changes.push(format!(
            "remote.ignore_empty_layers = {}",
            override_config.ignore_empty_layers
        ));
        base.ignore_empty_layers = override_config.ignore_empty_layers;
    }
    if !override_config.shared_configs.is_empty()
        && override_config.shared_configs != base.shared_configs
    {
        changes.push(format!(
            "remote.shared_configs = [{} entries]",
            override_config.shared_configs.len()
        ));
        base.shared_configs = override_config.shared_configs;
    }
    if !override_config.extension_configs.is_empty()
        && override_config.extension_configs != base.extension_configs
    {
        changes.push(format!(
            "remote.extension_configs = [{} entries]",
            override_config.extension_configs.len()
        ));
        base.extension_configs = override_config.extension_configs;
    }
}

fn merge_application(
    base: &mut ApplicationConfig,
    override_config: ApplicationConfig,
    changes: &mut Vec<String>,
) {
    merge_optional(&mut base.name, override_config.name, "application.name", changes);
    if !override_config.profiles.is_empty() && override_config.profiles != base.profiles {
        changes.push(format!(
            "application.profiles = {}",
            override_config.profiles.join(",")
        ));
        base.profiles = override_config.profiles;
    }
}

fn merge_optional(
    base: &mut Option<String>,
    override_value: Option<String>,
    field: &str,
    changes: &mut Vec<String>,
) {
    if let Some(value) = override_value {
        if base.as_deref() != Some(value.as_str()) {
            changes.push(format!("{field} = {value}"));
            *base = Some(value);
        }
    }
}
