//! # Environment Variable Loader
//!
//! Loads configuration from environment variables following 12-factor app
//! principles.
//!
//! # Naming Convention
//! - `RC_*`: Remote configuration store settings
//! - `APP_*`: Host application identity

use std::env;
use std::fmt;

use crate::config::Config;

/// Settings taken from the environment.
///
/// Every field is `None` when its variable is unset, so a variable that is
/// explicitly set to a default value still overrides a file setting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub server_addr: Option<String>,
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub name: Option<String>,
    pub group: Option<String>,
    pub file_extension: Option<String>,
    pub timeout_ms: Option<u64>,
    pub refresh_enabled: Option<bool>,
    pub ignore_empty_layers: Option<bool>,
    pub application_name: Option<String>,
    pub profiles: Option<Vec<String>>,
}

impl EnvOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Writes every set field into `config`.
    ///
    /// Returns one `field = value` entry per value that actually changed.
    pub fn apply_to(&self, config: &mut Config) -> Vec<String> {
        let mut changes = Vec::new();
        let remote = &mut config.remote;

        apply(&mut remote.server_addr, &self.server_addr, "remote.server_addr", &mut changes);
        apply_optional(&mut remote.namespace, &self.namespace, "remote.namespace", &mut changes);
        apply_optional(&mut remote.prefix, &self.prefix, "remote.prefix", &mut changes);
        apply_optional(&mut remote.name, &self.name, "remote.name", &mut changes);
        apply(&mut remote.group, &self.group, "remote.group", &mut changes);
        apply(
            &mut remote.file_extension,
            &self.file_extension,
            "remote.file_extension",
            &mut changes,
        );
        apply(&mut remote.timeout_ms, &self.timeout_ms, "remote.timeout_ms", &mut changes);
        apply(
            &mut remote.refresh_enabled,
            &self.refresh_enabled,
            "remote.refresh_enabled",
            &mut changes,
        );
        apply(
            &mut remote.ignore_empty_layers,
            &self.ignore_empty_layers,
            "remote.ignore_empty_layers",
            &mut changes,
        );

        let application = &mut config.application;
        apply_optional(
            &mut application.name,
            &self.application_name,
            "application.name",
            &mut changes,
        );
        if let Some(profiles) = &self.profiles {
            if *profiles != application.profiles {
                changes.push(format!("application.profiles = {}", profiles.join(",")));
                application.profiles = profiles.clone();
            }
        }

        changes
    }
}

fn apply<T>(target: &mut T, value: &Option<T>, field: &str, changes: &mut Vec<String>)
where
    T: PartialEq + Clone + fmt::Display,
{
    if let Some(value) = value {
        if *target != *value {
            changes.push(format!("{field} = {value}"));
            *target = value.clone();
        }
    }
}

fn apply_optional(
    target: &mut Option<String>,
    value: &Option<String>,
    field: &str,
    changes: &mut Vec<String>,
) {
    if let Some(value) = value {
        if target.as_deref() != Some(value.as_str()) {
            changes.push(format!("{field} = {value}"));
            *target = Some(value.clone());
        }
    }
}

/// Read the `RC_*` and `APP_*` variables that are set.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Captures which settings the environment provides. A set variable that
/// does not parse is an error rather than a silent default; a blank string
/// variable counts as unset.
///
/// ## Environment Variables
/// ### Remote Store Settings (`RC_*`)
/// - `RC_SERVER_ADDR`: Store address (default: "127.0.0.1:8848")
/// - `RC_NAMESPACE`: Tenant namespace (optional)
/// - `RC_PREFIX`: Source identifier prefix (optional)
/// - `RC_NAME`: Fallback for the prefix (optional)
/// - `RC_GROUP`: Application layer group (default: "DEFAULT_GROUP")
/// - `RC_FILE_EXTENSION`: Application layer format (default: "properties")
/// - `RC_TIMEOUT_MS`: Fetch timeout in milliseconds (default: 3000)
/// - `RC_REFRESH_ENABLED`: Subscribe to changes (true/false, default: true)
/// - `RC_IGNORE_EMPTY_LAYERS`: Skip empty layers (true/false, default: false)
///
/// Shared and extension layer lists are only read from files.
///
/// ### Application Settings (`APP_*`)
/// - `APP_NAME`: Application name (optional)
/// - `APP_PROFILES_ACTIVE`: Comma separated active profiles. Set but empty
///   clears the profiles from the file.
pub fn load_env_overrides() -> Result<EnvOverrides, Box<dyn std::error::Error>> {
    Ok(EnvOverrides {
        server_addr: non_empty_env("RC_SERVER_ADDR"),
        namespace: non_empty_env("RC_NAMESPACE"),
        prefix: non_empty_env("RC_PREFIX"),
        name: non_empty_env("RC_NAME"),
        group: non_empty_env("RC_GROUP"),
        file_extension: non_empty_env("RC_FILE_EXTENSION"),
        timeout_ms: parse_env_opt("RC_TIMEOUT_MS")?,
        refresh_enabled: parse_bool_env_opt("RC_REFRESH_ENABLED")?,
        ignore_empty_layers: parse_bool_env_opt("RC_IGNORE_EMPTY_LAYERS")?,
        application_name: non_empty_env("APP_NAME"),
        profiles: env::var("APP_PROFILES_ACTIVE")
            .ok()
            .map(|profiles| parse_profiles(&profiles)),
    })
}

/// Load configuration from environment variables over the defaults.
///
/// ## Usage
/// ```rust,no_run
/// use config::load_from_env;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load_from_env()?;
///     println!("Store: {}", config.remote.server_addr);
///     Ok(())
/// }
/// ```
pub fn load_from_env() -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = Config::default();
    load_env_overrides()?.apply_to(&mut config);
    Ok(config)
}

/// Splits a comma separated profile list, dropping blanks.
pub fn parse_profiles(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env_opt<T>(key: &str) -> Result<Option<T>, Box<dyn std::error::Error>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty_env(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("{key}: {e}").into()),
        None => Ok(None),
    }
}

fn parse_bool_env_opt(key: &str) -> Result<Option<bool>, Box<dyn std::error::Error>> {
    match non_empty_env(key) {
        Some(value) => match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            other => Err(format!("{key}: invalid boolean '{other}'").into()),
        },
        None => Ok(None),
    }
}
