//! Connection configuration for the fingerprint storage backend.
//!
//! This module provides the `ConnectionConfig` struct with defaults that make
//! an all-default configuration structurally valid.

use crate::error::PgFingerprintError;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

/// Default server host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default PostgreSQL port.
pub const DEFAULT_PORT: u16 = 5432;
/// Default database name.
pub const DEFAULT_DATABASE_NAME: &str = "defaultDB";
/// TLS is off unless requested.
pub const DEFAULT_USE_TLS: bool = false;
/// Default transport bound in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2000;
/// Default handshake I/O bound in milliseconds.
pub const DEFAULT_SOCKET_TIMEOUT_MS: u64 = 2000;
/// No credential selected.
pub const DEFAULT_CREDENTIAL_ID: &str = "";

/// Tunable parameters needed to reach the PostgreSQL datastore.
///
/// # Security
/// Only the credential *id* is held here. Secret material is resolved per
/// probe and never stored on the config.
///
/// # Example
/// ```rust
/// use pgfingerprint_core::ConnectionConfig;
///
/// let config = ConnectionConfig::new("db.internal".to_string())
///     .with_port(6432)
///     .with_database_name("fingerprints".to_string())
///     .with_tls(true);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.socket_timeout_ms, 2000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectionConfig {
    /// Database host address
    pub host: String,
    /// TCP port, 1-65535
    pub port: u16,
    /// Logical database name
    pub database_name: String,
    /// Whether the connection must be TLS protected
    #[serde(rename = "useTLS", alias = "ssl")]
    pub use_tls: bool,
    /// Id of the selected credential; empty means none selected
    #[serde(alias = "credentialsId")]
    pub credential_id: String,
    /// Bound for establishing the transport, 0 disables the bound
    #[serde(alias = "connectionTimeout")]
    pub connect_timeout_ms: u64,
    /// Bound for handshake I/O once the transport is up, 0 disables the bound
    #[serde(alias = "socketTimeout")]
    pub socket_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            use_tls: DEFAULT_USE_TLS,
            credential_id: DEFAULT_CREDENTIAL_ID.to_string(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            socket_timeout_ms: DEFAULT_SOCKET_TIMEOUT_MS,
        }
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ConnectionConfig({}:{}/{}{})",
            self.host,
            self.port,
            self.database_name,
            if self.use_tls { " tls" } else { "" }
        )
    }
}

impl ConnectionConfig {
    /// Creates a new connection config with default values for everything but the host.
    pub fn new(host: String) -> Self {
        Self {
            host,
            ..Default::default()
        }
    }

    /// Builds a config from a possibly partial JSON document.
    ///
    /// Missing fields take their documented defaults.
    ///
    /// # Errors
    /// Returns error if a present field has the wrong type or is out of range
    pub fn from_json_value(value: serde_json::Value) -> crate::Result<Self> {
        serde_json::from_value(value).map_err(|e| PgFingerprintError::Serialization {
            context: "Invalid connection configuration document".to_string(),
            source: e,
        })
    }

    /// Loads a possibly partial config from a JSON file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not a valid config document
    pub fn from_json_file(path: &Path) -> crate::Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| PgFingerprintError::Io {
            context: format!("Failed to read config file {}", path.display()),
            source: e,
        })?;
        serde_json::from_str(&raw).map_err(|e| PgFingerprintError::Serialization {
            context: format!("Invalid config file {}", path.display()),
            source: e,
        })
    }

    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns error if the host is empty or unparseable, or the port is 0
    pub fn validate(&self) -> crate::Result<()> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(PgFingerprintError::configuration("host cannot be empty"));
        }

        if host.parse::<IpAddr>().is_err() && url::Host::parse(host).is_err() {
            return Err(PgFingerprintError::configuration(format!(
                "host '{}' is not a valid hostname or IP address",
                host
            )));
        }

        if self.port == 0 {
            return Err(PgFingerprintError::configuration(
                "port must be between 1 and 65535",
            ));
        }

        Ok(())
    }

    /// Transport bound, `None` when disabled.
    pub fn connect_timeout(&self) -> Option<Duration> {
        non_zero_millis(self.connect_timeout_ms)
    }

    /// Handshake I/O bound, `None` when disabled.
    pub fn socket_timeout(&self) -> Option<Duration> {
        non_zero_millis(self.socket_timeout_ms)
    }

    /// Whether a credential has been selected.
    pub fn has_credential(&self) -> bool {
        !self.credential_id.trim().is_empty()
    }

    /// Builder method to set port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder method to set the database name.
    pub fn with_database_name(mut self, database_name: String) -> Self {
        self.database_name = database_name;
        self
    }

    /// Builder method to toggle TLS.
    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    /// Builder method to select a credential.
    pub fn with_credential_id(mut self, credential_id: String) -> Self {
        self.credential_id = credential_id;
        self
    }

    /// Builder method to set the transport timeout.
    pub fn with_connect_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.connect_timeout_ms = timeout_ms;
        self
    }

    /// Builder method to set the handshake I/O timeout.
    pub fn with_socket_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.socket_timeout_ms = timeout_ms;
        self
    }
}

fn non_zero_millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_connection_config_default() {
        let config = ConnectionConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.database_name, "defaultDB");
        assert!(!config.use_tls);
        assert_eq!(config.credential_id, "");
        assert_eq!(config.connect_timeout_ms, 2000);
        assert_eq!(config.socket_timeout_ms, 2000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_document_takes_defaults() {
        let config = ConnectionConfig::from_json_value(json!({
            "host": "pg.example.com",
            "useTLS": true
        }))
        .unwrap();

        assert_eq!(config.host, "pg.example.com");
        assert!(config.use_tls);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database_name, DEFAULT_DATABASE_NAME);
        assert_eq!(config.credential_id, DEFAULT_CREDENTIAL_ID);
        assert_eq!(config.connect_timeout_ms, DEFAULT_CONNECT_TIMEOUT_MS);
        assert_eq!(config.socket_timeout_ms, DEFAULT_SOCKET_TIMEOUT_MS);
    }

    #[test]
    fn test_empty_document_equals_default() {
        let config = ConnectionConfig::from_json_value(json!({})).unwrap();
        assert_eq!(config, ConnectionConfig::default());
    }

    #[test]
    fn test_legacy_form_names_accepted() {
        let config = ConnectionConfig::from_json_value(json!({
            "ssl": true,
            "credentialsId": "pg-creds",
            "connectionTimeout": 500,
            "socketTimeout": 750
        }))
        .unwrap();

        assert!(config.use_tls);
        assert_eq!(config.credential_id, "pg-creds");
        assert_eq!(config.connect_timeout_ms, 500);
        assert_eq!(config.socket_timeout_ms, 750);
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert!(ConnectionConfig::from_json_value(json!({ "port": 70000 })).is_err());
        assert!(ConnectionConfig::from_json_value(json!({ "connectTimeoutMs": -1 })).is_err());
    }

    #[test]
    fn test_connection_config_validation() {
        let config = ConnectionConfig {
            host: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ConnectionConfig {
            host: "bad host".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ConnectionConfig {
            port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        assert!(ConnectionConfig::new("::1".to_string()).validate().is_ok());
        assert!(ConnectionConfig::new("10.0.0.7".to_string()).validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_disables_bound() {
        let config = ConnectionConfig::default()
            .with_connect_timeout_ms(0)
            .with_socket_timeout_ms(150);

        assert_eq!(config.connect_timeout(), None);
        assert_eq!(config.socket_timeout(), Some(Duration::from_millis(150)));
    }

    #[test]
    fn test_connection_config_display_omits_credential() {
        let config = ConnectionConfig::new("example.com".to_string())
            .with_database_name("fingerprints".to_string())
            .with_credential_id("prod-admin".to_string())
            .with_tls(true);

        let display = format!("{}", config);
        assert_eq!(display, "ConnectionConfig(example.com:5432/fingerprints tls)");
        assert!(!display.contains("prod-admin"));
    }
}
