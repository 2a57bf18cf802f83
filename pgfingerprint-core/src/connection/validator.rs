//! The admin-only "test connectivity" operation.

use super::{ConnectionFactory, ConnectionParams};
use crate::config::ConnectionConfig;
use crate::credentials::CredentialResolver;
use crate::outcome::ValidationOutcome;
use crate::security::{Capability, PermissionChecker, PermissionContext};
use crate::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Reported to callers without system administration rights.
pub const ADMIN_REQUIRED_MESSAGE: &str = "Need admin permission to perform this action";

/// Prefix of every connectivity failure message.
pub const CONNECTION_ERROR_PREFIX: &str = "Connection error : ";

/// Exercises a full configuration end-to-end without persisting anything.
///
/// Stateless: concurrent calls need no coordination. A call may block for up
/// to the two configured timeouts, so keep it off latency-sensitive paths.
/// There is no retry.
#[derive(Clone)]
pub struct ConnectionValidator {
    resolver: CredentialResolver,
    factory: Arc<dyn ConnectionFactory>,
    permissions: Arc<dyn PermissionChecker>,
}

impl ConnectionValidator {
    /// Creates a validator.
    ///
    /// # Arguments
    /// * `resolver` - Resolves the selected credential for the probe
    /// * `factory` - Opens the probe connection
    /// * `permissions` - Checked for system `Administer` before anything else
    pub fn new(
        resolver: CredentialResolver,
        factory: Arc<dyn ConnectionFactory>,
        permissions: Arc<dyn PermissionChecker>,
    ) -> Self {
        Self {
            resolver,
            factory,
            permissions,
        }
    }

    /// Tests connectivity for `config` on behalf of `context`.
    ///
    /// Non-administrators are refused before any credential lookup or network
    /// activity. Every fault is reported as a `Failure` outcome.
    pub async fn test(
        &self,
        config: &ConnectionConfig,
        context: &PermissionContext,
    ) -> ValidationOutcome {
        if !self
            .permissions
            .has_permission(&context.principal, Capability::Administer, None)
        {
            warn!(
                principal = context.principal.name(),
                "Connection test refused: administer permission required"
            );
            return ValidationOutcome::failure(ADMIN_REQUIRED_MESSAGE);
        }

        match self.probe(config).await {
            Ok(()) => ValidationOutcome::success("Success"),
            Err(e) => {
                warn!("Connection test for {} failed: {}", config, e);
                ValidationOutcome::failure(format!("{}{}", CONNECTION_ERROR_PREFIX, e))
            }
        }
    }

    async fn probe(&self, config: &ConnectionConfig) -> Result<()> {
        config.validate()?;

        let credentials = if config.has_credential() {
            self.resolver.resolve(&config.credential_id).await?
        } else {
            None
        };
        let params = ConnectionParams::assemble(config, credentials);
        info!(
            authenticated = params.credentials.is_some(),
            "Testing connection to {}",
            params.to_safe_string()
        );

        let connection = self.factory.open(&params).await?;
        if let Err(e) = connection.close().await {
            // The probe already proved connectivity; the drop released the socket.
            warn!("Failed to close test connection cleanly: {}", e);
        }

        info!("Connection test to {} succeeded", params.to_safe_string());
        Ok(())
    }
}
