//! # Stratus Errors
//!
//! Error taxonomy for the remote configuration client.
//!
//! - `StoreError`: transient failures talking to the configuration store.
//!   Recovered locally by the layer builder.
//! - `ParseError`: malformed payloads. Recovered locally by the layer builder.
//! - `ResolveError`: authoring and bootstrap mistakes. Fatal for the current
//!   resolution pass.
//!
//! All variants use named fields so messages identify the offending key.

use thiserror::Error;

/// Failures reported by a configuration store client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Fetch timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Configuration store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Configuration store returned error {code}: {message}")]
    Remote { code: i32, message: String },
}

impl StoreError {
    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Timeout { .. } => "timeout",
            StoreError::Unavailable { .. } => "unavailable",
            StoreError::Remote { .. } => "remote",
        }
    }
}

/// Payload parsing errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unsupported configuration format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Failed to parse {format} payload: {reason}")]
    Syntax { format: String, reason: String },
}

/// Fatal errors for a resolution pass.
///
/// Transient fetch and parse failures never surface here; they degrade the
/// affected layer to empty instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("the [ remote.config.{list}[{index}] ] must give an identifier")]
    MissingIdentifier { list: String, index: usize },

    #[error("the [ remote.config.{list}[{index}] ] must give a group")]
    MissingGroup { list: String, index: usize },

    #[error("Invalid setting [ remote.config.{key} ]: {reason}")]
    InvalidSetting { key: String, reason: String },

    #[error("Cannot connect to configuration store at {server_addr}: {reason}")]
    ConnectionFailure { server_addr: String, reason: String },
}

impl ResolveError {
    /// Whether the error comes from the declared settings rather than the
    /// runtime environment.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, ResolveError::ConnectionFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_identifier_names_list_and_index() {
        let err = ResolveError::MissingIdentifier {
            list: "shared-configs".to_string(),
            index: 1,
        };
        assert_eq!(
            err.to_string(),
            "the [ remote.config.shared-configs[1] ] must give an identifier"
        );
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_connection_failure_is_not_configuration_error() {
        let err = ResolveError::ConnectionFailure {
            server_addr: "10.0.0.1:8848".to_string(),
            reason: "refused".to_string(),
        };
        assert!(!err.is_configuration_error());
        assert!(err.to_string().contains("10.0.0.1:8848"));
    }

    #[test]
    fn test_store_error_display() {
        let errors = vec![
            (
                StoreError::Timeout { timeout_ms: 3000 },
                "Fetch timed out after 3000ms",
            ),
            (
                StoreError::Unavailable {
                    reason: "no route".to_string(),
                },
                "Configuration store unavailable: no route",
            ),
            (
                StoreError::Remote {
                    code: 403,
                    message: "forbidden".to_string(),
                },
                "Configuration store returned error 403: forbidden",
            ),
        ];

        for (error, expected) in errors {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_store_error_kind() {
        assert_eq!(StoreError::Timeout { timeout_ms: 1 }.kind(), "timeout");
        assert_eq!(
            StoreError::Remote {
                code: 500,
                message: String::new()
            }
            .kind(),
            "remote"
        );
    }
}
