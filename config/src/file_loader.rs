//! # Bootstrap File Loading
//!
//! Reads the bootstrap settings (store address, layer lists, application
//! identity) from a TOML, YAML or JSON file. The format follows the file
//! extension.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::config::Config;

/// Bootstrap file loading error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Bootstrap file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read bootstrap file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML bootstrap file: {0}")]
    TomlParse(String),

    #[error("Failed to parse YAML bootstrap file: {0}")]
    YamlParse(String),

    #[error("Failed to parse JSON bootstrap file: {0}")]
    JsonParse(String),

    #[error("Bootstrap file has no extension")]
    NoExtension,

    #[error("Unsupported bootstrap file format: {0}")]
    UnsupportedFormat(String),
}

/// Structured formats a bootstrap file can be written in.
///
/// `properties` is a valid remote layer format but not a bootstrap format:
/// it has no way to express the shared and extension layer lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapFormat {
    Toml,
    Yaml,
    Json,
}

impl BootstrapFormat {
    pub fn from_extension(extension: &str) -> Result<Self, ConfigFileError> {
        match extension.to_ascii_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            "properties" => Err(ConfigFileError::UnsupportedFormat(
                "properties (layer lists need toml, yaml or json)".to_string(),
            )),
            other => Err(ConfigFileError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigFileError> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or(ConfigFileError::NoExtension)?;
        Self::from_extension(extension)
    }

    /// Parses bootstrap settings already read into memory.
    pub fn parse(self, contents: &str) -> Result<Config, ConfigFileError> {
        match self {
            Self::Toml => {
                toml::from_str(contents).map_err(|e| ConfigFileError::TomlParse(e.to_string()))
            }
            Self::Yaml => serde_yaml::from_str(contents)
                .map_err(|e| ConfigFileError::YamlParse(e.to_string())),
            Self::Json => serde_json::from_str(contents)
                .map_err(|e| ConfigFileError::JsonParse(e.to_string())),
        }
    }
}

impl fmt::Display for BootstrapFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Toml => "toml",
            Self::Yaml => "yaml",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

fn read_bootstrap(path: &Path) -> Result<String, ConfigFileError> {
    match fs::read_to_string(path) {
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(ConfigFileError::FileNotFound(path.display().to_string()))
        }
        result => Ok(result?),
    }
}

fn load_as(path: &Path, format: BootstrapFormat) -> Result<Config, ConfigFileError> {
    let contents = read_bootstrap(path)?;
    let config = format.parse(&contents)?;
    tracing::debug!(path = %path.display(), %format, "loaded bootstrap file");
    Ok(config)
}

/// Load bootstrap settings from a TOML file.
///
/// # M-CANONICAL-DOCS
///
/// ## Usage
/// ```rust,no_run
/// use config::load_from_toml;
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load_from_toml(Path::new("bootstrap.toml"))?;
///     println!("Store: {}", config.remote.server_addr);
///     Ok(())
/// }
/// ```
///
/// ## Error Handling
/// - `FileNotFound` when nothing exists at `path`
/// - `Io` for any other read failure, including a file that is not UTF-8
/// - `TomlParse` for invalid syntax or mistyped fields
pub fn load_from_toml(path: &Path) -> Result<Config, ConfigFileError> {
    load_as(path, BootstrapFormat::Toml)
}

/// Load bootstrap settings from a YAML file.
///
/// Errors follow [`load_from_toml`], with `YamlParse` for syntax errors.
pub fn load_from_yaml(path: &Path) -> Result<Config, ConfigFileError> {
    load_as(path, BootstrapFormat::Yaml)
}

/// Load bootstrap settings from a JSON file.
pub fn load_from_json(path: &Path) -> Result<Config, ConfigFileError> {
    load_as(path, BootstrapFormat::Json)
}

/// Load bootstrap settings, picking the format from the extension.
///
/// # M-CANONICAL-DOCS
///
/// ## Supported Formats
/// - `.toml`
/// - `.yaml` / `.yml`
/// - `.json`
///
/// `.properties` and anything else is rejected with `UnsupportedFormat`
/// before the file is read.
pub fn load_from_file(path: &Path) -> Result<Config, ConfigFileError> {
    let format = BootstrapFormat::from_path(path)?;
    load_as(path, format)
}
