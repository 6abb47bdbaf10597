//! Error types for avrowire
//!
//! This module defines the application-level error type, using `thiserror`
//! for the variants and `anyhow` for propagation through commands.
//! Library components return their own typed errors, which convert into
//! [`AvrowireError`] at the application boundary.

use thiserror::Error;

use crate::kafka::KafkaClientError;
use crate::registry::ClientError;
use crate::wire::WireError;

/// Main error type for avrowire operations
#[derive(Error, Debug)]
pub enum AvrowireError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schema registry errors
    #[error("Registry error: {0}")]
    Registry(#[from] ClientError),

    /// Envelope encode/decode errors
    #[error("Wire error: {0}")]
    Wire(#[from] WireError),

    /// Kafka consumer/producer errors
    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaClientError),

    /// Invalid command input (bad hex, bad JSON literal, ...)
    #[error("Invalid input: {0}")]
    Input(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for avrowire operations
///
/// Uses `anyhow::Result` so commands can attach context while keeping the
/// underlying [`AvrowireError`] downcastable.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryError;

    #[test]
    fn test_config_error_display() {
        let error = AvrowireError::Config("no registry urls".to_string());
        assert_eq!(error.to_string(), "Configuration error: no registry urls");
    }

    #[test]
    fn test_registry_error_conversion() {
        let client: ClientError = RegistryError::new(40401, "Subject not found.").into();
        let error: AvrowireError = client.into();
        assert_eq!(
            error.to_string(),
            "Registry error: Registry error: 40401 - Subject not found."
        );
    }

    #[test]
    fn test_wire_error_conversion() {
        let error: AvrowireError = WireError::MessageTooShort(2).into();
        assert!(matches!(error, AvrowireError::Wire(WireError::MessageTooShort(2))));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: AvrowireError = io_error.into();
        assert!(matches!(error, AvrowireError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: AvrowireError = json_error.into();
        assert!(matches!(error, AvrowireError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: AvrowireError = yaml_error.into();
        assert!(matches!(error, AvrowireError::Yaml(_)));
    }

    #[test]
    fn test_anyhow_downcast() {
        let result: Result<()> = Err(AvrowireError::Input("bad hex".to_string()).into());
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AvrowireError>(),
            Some(AvrowireError::Input(_))
        ));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AvrowireError>();
    }
}
