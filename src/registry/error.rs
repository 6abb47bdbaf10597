//! Error types for schema registry operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::CodecError;

/// Message used when a registry error body cannot be parsed.
pub const UNRECOGNIZED_ERROR: &str = "Unrecognized error found";

/// An error reported by the schema registry.
///
/// Built from the registry's `{error_code, message}` body, or synthesized
/// from the raw HTTP status when the body is not in that shape.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{code} - {message}")]
pub struct RegistryError {
    /// Registry error code (often the HTTP status or a refinement of it).
    #[serde(rename = "error_code")]
    pub code: i64,
    /// Human readable message from the registry.
    pub message: String,
}

impl RegistryError {
    /// Creates a registry error from a code and message.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Parses a non-success response body.
    ///
    /// Falls back to the HTTP status and a generic message when the body is
    /// not a JSON `{error_code, message}` object.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        serde_json::from_slice(body)
            .unwrap_or_else(|_| Self::new(i64::from(status), UNRECOGNIZED_ERROR))
    }
}

/// Errors returned by registry clients, the cache and the schema store.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection, timeout or body read failure after retries were exhausted.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success response reported by the registry.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Schema text returned by the registry could not be compiled.
    #[error("Schema error: {0}")]
    Schema(#[from] CodecError),

    /// Success response whose body was not the expected JSON shape.
    #[error("Invalid registry response: {0}")]
    Json(#[from] serde_json::Error),

    /// Id or subject is not part of a preloaded store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Client could not be constructed from its configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A thread panicked while holding a shared lock.
    #[error("Lock poisoned: {0}")]
    Poisoned(String),
}

impl ClientError {
    /// Returns the registry error if this failure was reported by the registry.
    pub fn registry_error(&self) -> Option<&RegistryError> {
        match self {
            Self::Registry(e) => Some(e),
            _ => None,
        }
    }

    /// Returns true for lookup misses in a preloaded store.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
