//! Administrative surface of the fingerprint storage backend.
//!
//! The UI layer talks to a `StorageDescriptor`: it pre-fills forms with
//! defaults, populates the credential selector, validates the selection
//! inline, and runs the connectivity probe. Anti-forgery and write-intent
//! checks for `test_connection` belong to the calling layer.

use crate::config::ConnectionConfig;
use crate::connection::{ConnectionFactory, ConnectionValidator};
use crate::credentials::{CredentialChoice, CredentialResolver, CredentialStore};
use crate::outcome::ValidationOutcome;
use crate::security::{PermissionChecker, PermissionContext};
use async_trait::async_trait;
use std::sync::Arc;

/// Operations a storage backend exposes to its configuration UI.
#[async_trait]
pub trait StorageDescriptor: Send + Sync {
    /// Human readable backend name.
    fn display_name(&self) -> &str;

    /// Configuration used to pre-fill an empty form.
    fn defaults(&self) -> ConnectionConfig {
        ConnectionConfig::default()
    }

    /// Entries for the credential selector. Never fails.
    async fn fill_credential_items(
        &self,
        context: &PermissionContext,
        current_selection: &str,
    ) -> Vec<CredentialChoice>;

    /// Inline validation of the selected credential. No network access.
    async fn check_credential_id(
        &self,
        context: &PermissionContext,
        credential_id: &str,
    ) -> ValidationOutcome;

    /// Admin-only connectivity probe.
    async fn test_connection(
        &self,
        config: &ConnectionConfig,
        context: &PermissionContext,
    ) -> ValidationOutcome;
}

/// PostgreSQL fingerprint storage, wired from injected collaborators.
#[derive(Clone)]
pub struct PostgresStorageDescriptor {
    resolver: CredentialResolver,
    validator: ConnectionValidator,
}

impl PostgresStorageDescriptor {
    /// Name shown in the backend picker.
    pub const DISPLAY_NAME: &'static str = "PostgreSQL Fingerprint Storage";

    /// Wires the descriptor from injected collaborators.
    ///
    /// # Arguments
    /// * `store` - External credential store
    /// * `permissions` - Permission system shared by listing and the probe
    /// * `factory` - Connection factory used by `test_connection`
    pub fn new(
        store: Arc<dyn CredentialStore>,
        permissions: Arc<dyn PermissionChecker>,
        factory: Arc<dyn ConnectionFactory>,
    ) -> Self {
        let resolver = CredentialResolver::new(store, permissions.clone());
        let validator = ConnectionValidator::new(resolver.clone(), factory, permissions);
        Self {
            resolver,
            validator,
        }
    }
}

#[async_trait]
impl StorageDescriptor for PostgresStorageDescriptor {
    fn display_name(&self) -> &str {
        Self::DISPLAY_NAME
    }

    async fn fill_credential_items(
        &self,
        context: &PermissionContext,
        current_selection: &str,
    ) -> Vec<CredentialChoice> {
        self.resolver.list(context, current_selection).await
    }

    async fn check_credential_id(
        &self,
        context: &PermissionContext,
        credential_id: &str,
    ) -> ValidationOutcome {
        self.resolver.validate(context, credential_id).await
    }

    async fn test_connection(
        &self,
        config: &ConnectionConfig,
        context: &PermissionContext,
    ) -> ValidationOutcome {
        self.validator.test(config, context).await
    }
}
