//! Connection factory seam and the connectivity probe.
//!
//! # Module Structure
//! - `validator`: admin-gated `ConnectionValidator::test`
//! - `postgres`: sqlx-backed factory (feature `postgresql`)
//!
//! # Timeouts
//! Two independent bounds apply at different phases: `connect_timeout` for
//! establishing the transport, `socket_timeout` for I/O once it is up. They
//! are never merged into one overall deadline.

use crate::config::ConnectionConfig;
use crate::error::PgFingerprintError;
use crate::security::Credentials;
use crate::Result;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

mod validator;

#[cfg(feature = "postgresql")]
pub mod postgres;

pub use validator::{ADMIN_REQUIRED_MESSAGE, CONNECTION_ERROR_PREFIX, ConnectionValidator};

/// Fully assembled parameters for one connection attempt.
///
/// Lives only for the duration of a single probe.
#[derive(Clone)]
pub struct ConnectionParams {
    /// Server host, trimmed
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database to open
    pub database_name: String,
    /// Require TLS for the session
    pub use_tls: bool,
    /// `None` for anonymous/default authentication
    pub credentials: Option<Credentials>,
    /// Bound on establishing the transport
    pub connect_timeout: Option<Duration>,
    /// Bound on each handshake I/O phase
    pub socket_timeout: Option<Duration>,
}

impl ConnectionParams {
    /// Combines a configuration with the resolved secret.
    ///
    /// # Arguments
    /// * `config` - Connection settings; the host is trimmed
    /// * `credentials` - Resolved secret, `None` for default authentication
    ///
    /// # Returns
    /// Parameters with zero timeouts mapped to `None`
    pub fn assemble(config: &ConnectionConfig, credentials: Option<Credentials>) -> Self {
        Self {
            host: config.host.trim().to_string(),
            port: config.port,
            database_name: config.database_name.clone(),
            use_tls: config.use_tls,
            credentials,
            connect_timeout: config.connect_timeout(),
            socket_timeout: config.socket_timeout(),
        }
    }

    /// Target description safe to log: no username, no password.
    ///
    /// ```rust
    /// use pgfingerprint_core::{ConnectionConfig, connection::ConnectionParams};
    ///
    /// let params = ConnectionParams::assemble(&ConnectionConfig::default(), None);
    /// assert_eq!(params.to_safe_string(), "postgres://localhost:5432/defaultDB?sslmode=disable");
    /// ```
    pub fn to_safe_string(&self) -> String {
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        format!(
            "postgres://{}:{}/{}?sslmode={}",
            host,
            self.port,
            self.database_name,
            if self.use_tls { "require" } else { "disable" }
        )
    }
}

impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("target", &self.to_safe_string())
            .field("authenticated", &self.credentials.is_some())
            .field("connect_timeout", &self.connect_timeout)
            .field("socket_timeout", &self.socket_timeout)
            .finish()
    }
}

/// A live connection returned by a factory.
#[async_trait]
pub trait OpenConnection: Send {
    /// Releases the connection.
    ///
    /// # Errors
    /// Returns error if the graceful shutdown fails; the resource is released
    /// regardless
    async fn close(self: Box<Self>) -> Result<()>;
}

/// External storage driver that opens and authenticates a connection.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Opens a connection honoring both timeouts in `params`.
    ///
    /// # Errors
    /// Returns error on any network, authentication, protocol or timeout fault
    async fn open(&self, params: &ConnectionParams) -> Result<Box<dyn OpenConnection>>;
}

/// Runs `future` under an optional bound.
///
/// `None` waits indefinitely. Expiry drops the future, releasing anything it
/// had partially opened, and reports `ConnectionTimeout` for `operation`.
///
/// # Errors
/// Returns `ConnectionTimeout` when the bound elapses first
pub async fn with_timeout<F>(
    limit: Option<Duration>,
    operation: &str,
    future: F,
) -> Result<F::Output>
where
    F: Future,
{
    match limit {
        None => Ok(future.await),
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| PgFingerprintError::connection_timeout(operation, limit)),
    }
}
