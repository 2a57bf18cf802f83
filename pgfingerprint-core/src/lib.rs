//! Connection configuration and validation for PostgreSQL fingerprint storage.
//!
//! This crate defines the tunable parameters for reaching the datastore,
//! resolves an operator-selected credential reference through a
//! permission-scoped lookup, and exposes an administrative connectivity
//! test that exercises the full configuration without persisting state.
//!
//! # Security Guarantees
//! - Configuration holds credential ids only; secrets live for one probe
//! - Secrets are zeroed on drop and redacted from `Debug` and logs
//! - Credential listing discloses nothing to unauthorized principals
//!
//! # Architecture
//! - `config`: recognized fields, types and defaults
//! - `credentials`: store seam and the permission-scoped resolver
//! - `connection`: factory seam, bounded probe and the PostgreSQL driver
//! - `descriptor`: the four operations offered to a configuration UI
//!
//! Collaborators (credential store, permission system, connection factory)
//! are injected as trait objects so each can be replaced by a test double.

pub mod config;
pub mod connection;
pub mod credentials;
pub mod descriptor;
pub mod error;
pub mod logging;
pub mod outcome;
pub mod security;

// Re-export commonly used types
pub use config::{ConfigField, ConnectionConfig, FieldKind};
pub use connection::{ConnectionFactory, ConnectionValidator, OpenConnection};
pub use credentials::{CredentialChoice, CredentialResolver, CredentialStore};
pub use descriptor::{PostgresStorageDescriptor, StorageDescriptor};
pub use error::{PgFingerprintError, Result};
pub use logging::init_logging;
pub use outcome::ValidationOutcome;
pub use security::{Capability, PermissionChecker, PermissionContext, Principal, Scope};

#[cfg(feature = "postgresql")]
pub use connection::postgres::PostgresConnectionFactory;
