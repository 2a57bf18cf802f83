//! PostgreSQL connection factory built on sqlx.
//!
//! # Phases
//! 1. TCP connection to `host:port` (DNS included), bounded by `connect_timeout`
//! 2. PostgreSQL startup, TLS negotiation and authentication followed by a
//!    ping, each bounded by `socket_timeout`, over the phase 1 socket
//!
//! sqlx dials its own transport, so the driver is pointed at a one-shot
//! loopback relay spliced onto the phase 1 stream. The server sees exactly
//! one connection per probe. A timed-out phase drops its future and the
//! relay, which closes both sockets.

use super::{ConnectionFactory, ConnectionParams, OpenConnection, with_timeout};
use crate::error::PgFingerprintError;
use crate::Result;
use async_trait::async_trait;
use sqlx::Connection;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing::debug;

/// Application name reported to the server for connection tracking.
pub const DEFAULT_APPLICATION_NAME: &str = concat!("pgfingerprint-", env!("CARGO_PKG_VERSION"));

/// Opens single, unpooled PostgreSQL connections for probing.
#[derive(Debug, Clone)]
pub struct PostgresConnectionFactory {
    application_name: String,
}

impl Default for PostgresConnectionFactory {
    fn default() -> Self {
        Self {
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
        }
    }
}

impl PostgresConnectionFactory {
    /// Creates a factory reporting [`DEFAULT_APPLICATION_NAME`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the application name sent in the startup packet.
    pub fn with_application_name(mut self, application_name: impl Into<String>) -> Self {
        self.application_name = application_name.into();
        self
    }

    /// Driver options for `params`, addressed at the configured host.
    ///
    /// Without credentials, or with an empty password, the driver falls back
    /// to its default resolution (environment, passfile, then the OS user).
    pub fn connect_options(&self, params: &ConnectionParams) -> PgConnectOptions {
        let ssl_mode = if params.use_tls {
            PgSslMode::Require
        } else {
            PgSslMode::Disable
        };

        let options = PgConnectOptions::new()
            .host(&params.host)
            .port(params.port)
            .database(&params.database_name)
            .ssl_mode(ssl_mode)
            .application_name(&self.application_name);

        match &params.credentials {
            Some(credentials) if credentials.has_password() => options
                .username(credentials.username())
                .password(credentials.password()),
            Some(credentials) => options.username(credentials.username()),
            None => options,
        }
    }

    async fn connect_transport(params: &ConnectionParams) -> Result<TcpStream> {
        let stream = with_timeout(
            params.connect_timeout,
            "Transport connect",
            TcpStream::connect((params.host.as_str(), params.port)),
        )
        .await?
        .map_err(|e| {
            PgFingerprintError::connection_failed(
                format!("Failed to reach {}:{}", params.host, params.port),
                e,
            )
        })?;
        stream.set_nodelay(true).map_err(|e| {
            PgFingerprintError::connection_failed("Failed to configure transport", e)
        })?;
        Ok(stream)
    }
}

#[async_trait]
impl ConnectionFactory for PostgresConnectionFactory {
    async fn open(&self, params: &ConnectionParams) -> Result<Box<dyn OpenConnection>> {
        let upstream = Self::connect_transport(params).await?;
        let relay = TransportRelay::start(upstream).await?;

        let target = params.to_safe_string();
        let options = self
            .connect_options(params)
            .host(&relay.local_addr.ip().to_string())
            .port(relay.local_addr.port());

        let mut connection = with_timeout(
            params.socket_timeout,
            "PostgreSQL handshake",
            PgConnection::connect_with(&options),
        )
        .await?
        .map_err(|e| {
            PgFingerprintError::connection_failed(format!("Failed to connect to {}", target), e)
        })?;

        with_timeout(params.socket_timeout, "PostgreSQL ping", connection.ping())
            .await?
            .map_err(|e| {
                PgFingerprintError::connection_failed(format!("Ping to {} failed", target), e)
            })?;

        debug!("Opened probe connection to {}", target);
        Ok(Box::new(PostgresConnection {
            inner: connection,
            socket_timeout: params.socket_timeout,
            relay,
        }))
    }
}

/// Loopback listener that splices its first accepted socket onto `upstream`.
///
/// Dropping the relay aborts the copy task, closing both sides.
struct TransportRelay {
    local_addr: SocketAddr,
    task: JoinHandle<()>,
}

impl TransportRelay {
    async fn start(upstream: TcpStream) -> Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .map_err(|e| {
                PgFingerprintError::connection_failed("Failed to bind transport relay", e)
            })?;
        let local_addr = listener.local_addr().map_err(|e| {
            PgFingerprintError::connection_failed("Failed to read transport relay address", e)
        })?;

        let task = tokio::spawn(async move {
            let mut upstream = upstream;
            match listener.accept().await {
                Ok((mut inbound, _)) => {
                    drop(listener);
                    if let Err(e) =
                        tokio::io::copy_bidirectional(&mut inbound, &mut upstream).await
                    {
                        debug!("Transport relay closed: {}", e);
                    }
                }
                Err(e) => debug!("Transport relay accept failed: {}", e),
            }
        });

        Ok(Self { local_addr, task })
    }
}

impl Drop for TransportRelay {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct PostgresConnection {
    inner: PgConnection,
    socket_timeout: Option<Duration>,
    relay: TransportRelay,
}

#[async_trait]
impl OpenConnection for PostgresConnection {
    async fn close(self: Box<Self>) -> Result<()> {
        let Self {
            inner,
            socket_timeout,
            relay,
        } = *self;

        let closed = with_timeout(socket_timeout, "PostgreSQL close", inner.close()).await;
        drop(relay);
        closed?.map_err(|e| PgFingerprintError::connection_failed("Failed to close connection", e))
    }
}
