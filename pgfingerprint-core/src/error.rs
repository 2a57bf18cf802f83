//! Error types for fingerprint storage configuration.
//!
//! Errors produced here never carry secret material. Connection errors keep
//! the driver's message because operators need it to diagnose a failed probe,
//! but passwords are never part of the assembled text.

use std::time::Duration;
use thiserror::Error;

/// Main error type for configuration, credential and probe operations.
#[derive(Debug, Error)]
pub enum PgFingerprintError {
    /// Opening or using the database connection failed
    #[error("{context}: {source}")]
    Connection {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A bounded connection phase did not finish in time
    #[error("{operation} timed out after {}ms", timeout.as_millis())]
    ConnectionTimeout {
        operation: String,
        timeout: Duration,
    },

    /// Configuration value is missing or invalid
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The credential store could not be queried
    #[error("Credential store error: {context}")]
    CredentialStore {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A non-blank credential id did not resolve
    #[error("Cannot find credentials with id '{id}'")]
    CredentialNotFound { id: String },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with PgFingerprintError
pub type Result<T> = std::result::Result<T, PgFingerprintError>;

impl PgFingerprintError {
    /// Creates a connection error with context
    pub fn connection_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a timeout error for the named phase
    pub fn connection_timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        Self::ConnectionTimeout {
            operation: operation.into(),
            timeout,
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a credential store error with context
    pub fn credential_store<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::CredentialStore {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a not-found error for a credential id
    pub fn credential_not_found(id: impl Into<String>) -> Self {
        Self::CredentialNotFound { id: id.into() }
    }
}
