//! Configuration types for the fingerprint storage connection.
//!
//! - `ConnectionConfig`: connection settings with documented defaults
//! - `ConfigField`: canonical field names, kinds and defaults
//!
//! # Security
//! The configuration holds a credential id only, never secret material.

mod connection;
mod schema;

pub use connection::{
    ConnectionConfig, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_CREDENTIAL_ID, DEFAULT_DATABASE_NAME,
    DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SOCKET_TIMEOUT_MS, DEFAULT_USE_TLS,
};
pub use schema::{ConfigField, FieldKind, FieldSpec, field_specs};
