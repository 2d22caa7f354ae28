//! # Configuration Structures
//!
//! Bootstrap settings for the remote configuration client.
//!
//! All configuration structures:
//! - Use `serde` for serialization/deserialization
//! - Use `validator` for input validation
//! - Provide defaults matching a stock configuration store deployment

use rc_core::{DEFAULT_GROUP, HostEnvironment};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Payload formats understood by the bundled parser.
pub const SUPPORTED_FILE_EXTENSIONS: &[&str] = &["properties", "yaml", "yml", "json", "toml"];

/// Top-level bootstrap configuration.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Aggregates the remote store settings and the host application identity
/// that together drive one resolution pass.
///
/// ## Usage
/// ```rust,no_run
/// use config::Config;
///
/// let config = Config::default();
/// println!("Store: {}", config.remote.server_addr);
/// ```
///
/// ## Fields
/// - `remote`: Remote configuration store and layer selection
/// - `application`: Application name and active profiles
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
pub struct Config {
    /// Remote configuration store settings
    #[serde(default)]
    #[validate(nested)]
    pub remote: RemoteConfigSettings,

    /// Host application identity
    #[serde(default)]
    pub application: ApplicationConfig,
}

impl Config {
    /// Host environment view consumed by the resolver.
    pub fn host_environment(&self) -> HostEnvironment {
        HostEnvironment {
            application_name: self.application.name.clone(),
            active_profiles: self.application.profiles.clone(),
        }
    }
}

/// Remote configuration store settings.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Selects the store to connect to and the layers to resolve from it.
///
/// ## Fields
/// - `server_addr`: Store address (default: "127.0.0.1:8848")
/// - `namespace`: Optional tenant namespace
/// - `prefix`: Source identifier prefix for application layers
/// - `name`: Fallback for `prefix`
/// - `group`: Group for application layers (default: "DEFAULT_GROUP")
/// - `file_extension`: Payload format of application layers (default:
///   "properties")
/// - `timeout_ms`: Fetch timeout (default: 3000, range: 1-120000)
/// - `refresh_enabled`: Subscribe to change notifications (default: true)
/// - `ignore_empty_layers`: Skip empty layers in the composite view
///   (default: false)
/// - `shared_configs`: Lowest precedence layers
/// - `extension_configs`: Layers above shared configs
///
/// Shared and extension entries are checked by the resolver, which reports
/// the offending list and index.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct RemoteConfigSettings {
    #[serde(default = "default_server_addr")]
    #[validate(length(min = 1, max = 255))]
    pub server_addr: String,

    #[serde(default)]
    pub namespace: Option<String>,

    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default = "default_group")]
    #[validate(length(min = 1, max = 128))]
    pub group: String,

    #[serde(default = "default_file_extension")]
    #[validate(custom(function = "validate_file_extension"))]
    pub file_extension: String,

    #[serde(default = "default_timeout_ms")]
    #[validate(range(min = 1, max = 120000))]
    pub timeout_ms: u64,

    #[serde(default = "default_refresh_enabled")]
    pub refresh_enabled: bool,

    #[serde(default)]
    pub ignore_empty_layers: bool,

    #[serde(default)]
    pub shared_configs: Vec<ConfigEntry>,

    #[serde(default)]
    pub extension_configs: Vec<ConfigEntry>,
}

fn default_server_addr() -> String {
    "127.0.0.1:8848".to_string()
}

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}

fn default_file_extension() -> String {
    "properties".to_string()
}

fn default_timeout_ms() -> u64 {
    3000
}

fn default_refresh_enabled() -> bool {
    true
}

fn validate_file_extension(value: &str) -> Result<(), validator::ValidationError> {
    if SUPPORTED_FILE_EXTENSIONS.contains(&value) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("Unsupported file extension"))
    }
}

impl Default for RemoteConfigSettings {
    fn default() -> Self {
        Self {
            server_addr: default_server_addr(),
            namespace: None,
            prefix: None,
            name: None,
            group: default_group(),
            file_extension: default_file_extension(),
            timeout_ms: default_timeout_ms(),
            refresh_enabled: default_refresh_enabled(),
            ignore_empty_layers: false,
            shared_configs: Vec::new(),
            extension_configs: Vec::new(),
        }
    }
}

impl RemoteConfigSettings {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }
}

/// One shared or extension layer declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigEntry {
    /// Source identifier, e.g. `common.yaml`
    #[serde(default)]
    pub identifier: String,

    #[serde(default = "default_group")]
    pub group: String,

    /// Whether the layer receives live updates
    #[serde(default)]
    pub refresh: bool,
}

impl ConfigEntry {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            group: default_group(),
            refresh: false,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn refreshable(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }
}

/// Host application identity.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ApplicationConfig {
    /// Application name, used when neither prefix nor name is set
    #[serde(default)]
    pub name: Option<String>,

    /// Active profiles, in activation order
    #[serde(default)]
    pub profiles: Vec<String>,
}
