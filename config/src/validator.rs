//! # Configuration Validation
//!
//! Provides validation for bootstrap configuration using the `validator`
//! crate.

use crate::config::Config;
use validator::Validate;

/// Validate configuration structure.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Validates all configuration fields using the `validator` crate.
///
/// ## Usage
/// ```rust,no_run
/// use config::{Config, validator::validate};
///
/// let config = Config::default();
/// match validate(&config) {
///     Ok(()) => println!("Configuration is valid"),
///     Err(errors) => println!("Validation errors: {:?}", errors),
/// }
/// ```
///
/// ## Validation Rules
/// - `remote.server_addr`: 1-255 characters
/// - `remote.group`: 1-128 characters
/// - `remote.file_extension`: one of properties, yaml, yml, json, toml
/// - `remote.timeout_ms`: 1-120000
///
/// Shared and extension entries are validated at resolution time so the
/// error can name the offending list and index.
pub fn validate(config: &Config) -> Result<(), validator::ValidationErrors> {
    config.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_empty_server_addr() {
        let mut config = Config::default();
        config.remote.server_addr = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_empty_group() {
        let mut config = Config::default();
        config.remote.group = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_timeout_out_of_range() {
        let mut config = Config::default();
        config.remote.timeout_ms = 120_001;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        for extension in ["properties", "yaml", "yml", "json", "toml"] {
            let mut config = Config::default();
            config.remote.file_extension = extension.to_string();
            assert!(validate(&config).is_ok());
        }

        let mut config = Config::default();
        config.remote.file_extension = "xml".to_string();
        assert!(validate(&config).is_err());
    }
}
