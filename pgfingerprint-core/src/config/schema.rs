//! Canonical field identities for the connection configuration.

use super::connection::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_CREDENTIAL_ID, DEFAULT_DATABASE_NAME, DEFAULT_HOST,
    DEFAULT_PORT, DEFAULT_SOCKET_TIMEOUT_MS, DEFAULT_USE_TLS,
};
use serde::Serialize;
use serde_json::Value;

/// Value type of a configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free text
    String,
    /// Unsigned integer
    Integer,
    /// `true` or `false`
    Boolean,
}

/// A recognized configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    /// `host`
    Host,
    /// `port`
    Port,
    /// `databaseName`
    DatabaseName,
    /// `useTLS`
    UseTls,
    /// `credentialId`
    CredentialId,
    /// `connectTimeoutMs`
    ConnectTimeoutMs,
    /// `socketTimeoutMs`
    SocketTimeoutMs,
}

impl ConfigField {
    /// Every field in form order.
    pub const ALL: [Self; 7] = [
        Self::Host,
        Self::Port,
        Self::DatabaseName,
        Self::UseTls,
        Self::CredentialId,
        Self::ConnectTimeoutMs,
        Self::SocketTimeoutMs,
    ];

    /// Wire name, matching the serialized `ConnectionConfig`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Port => "port",
            Self::DatabaseName => "databaseName",
            Self::UseTls => "useTLS",
            Self::CredentialId => "credentialId",
            Self::ConnectTimeoutMs => "connectTimeoutMs",
            Self::SocketTimeoutMs => "socketTimeoutMs",
        }
    }

    /// Value type of the field.
    pub fn kind(self) -> FieldKind {
        match self {
            Self::Host | Self::DatabaseName | Self::CredentialId => FieldKind::String,
            Self::Port | Self::ConnectTimeoutMs | Self::SocketTimeoutMs => FieldKind::Integer,
            Self::UseTls => FieldKind::Boolean,
        }
    }

    /// Default as a JSON value, matching `ConnectionConfig::default()`.
    pub fn default_value(self) -> Value {
        match self {
            Self::Host => Value::from(DEFAULT_HOST),
            Self::Port => Value::from(DEFAULT_PORT),
            Self::DatabaseName => Value::from(DEFAULT_DATABASE_NAME),
            Self::UseTls => Value::from(DEFAULT_USE_TLS),
            Self::CredentialId => Value::from(DEFAULT_CREDENTIAL_ID),
            Self::ConnectTimeoutMs => Value::from(DEFAULT_CONNECT_TIMEOUT_MS),
            Self::SocketTimeoutMs => Value::from(DEFAULT_SOCKET_TIMEOUT_MS),
        }
    }

    /// Looks a field up by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl std::fmt::Display for ConfigField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Serializable description of one field, used to render forms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    /// Wire name
    pub name: &'static str,
    /// Value type
    pub kind: FieldKind,
    /// Default as JSON
    pub default: Value,
}

impl From<ConfigField> for FieldSpec {
    fn from(field: ConfigField) -> Self {
        Self {
            name: field.name(),
            kind: field.kind(),
            default: field.default_value(),
        }
    }
}

/// Describes every field with its kind and default.
pub fn field_specs() -> Vec<FieldSpec> {
    ConfigField::ALL.into_iter().map(FieldSpec::from).collect()
}
