//! Permission-scoped credential listing, selection checks and resolution.

use super::store::{CredentialKind, CredentialRef, CredentialStore};
use crate::error::PgFingerprintError;
use crate::outcome::ValidationOutcome;
use crate::security::{Credentials, PermissionChecker, PermissionContext, can_view_credentials};
use crate::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Label of the "nothing selected" entry.
pub const NONE_SELECTED_LABEL: &str = "- none -";

/// Reported when a selected credential no longer exists or is not visible.
pub const CREDENTIAL_NOT_FOUND_MESSAGE: &str = "Cannot find currently selected credentials";

/// One entry of a credential selection control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialChoice {
    /// Label shown to the operator
    pub name: String,
    /// Credential id stored in the configuration, empty for none
    pub value: String,
}

impl CredentialChoice {
    /// Placeholder meaning no credential selected.
    pub fn none() -> Self {
        Self {
            name: NONE_SELECTED_LABEL.to_string(),
            value: String::new(),
        }
    }

    /// Entry for an already-configured id, shown without consulting the store.
    pub fn current(id: &str) -> Self {
        Self {
            name: id.to_string(),
            value: id.to_string(),
        }
    }

    /// Whether this is the "nothing selected" entry.
    pub fn is_none(&self) -> bool {
        self.value.is_empty()
    }
}

impl From<&CredentialRef> for CredentialChoice {
    fn from(reference: &CredentialRef) -> Self {
        Self {
            name: reference.display_name().to_string(),
            value: reference.id.clone(),
        }
    }
}

/// Selection list where each value appears at most once.
#[derive(Default)]
struct ChoiceList(Vec<CredentialChoice>);

impl ChoiceList {
    fn push(&mut self, choice: CredentialChoice) {
        if !self.0.iter().any(|existing| existing.value == choice.value) {
            self.0.push(choice);
        }
    }

    fn include_current(&mut self, current: &str) {
        if !is_blank(current) {
            self.push(CredentialChoice::current(current));
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Resolves credential references under a permission context.
///
/// Listing and inline validation are disclosure-gated and never fail.
/// Resolution for a probe bypasses the gate; callers authorize first.
#[derive(Clone)]
pub struct CredentialResolver {
    store: Arc<dyn CredentialStore>,
    permissions: Arc<dyn PermissionChecker>,
}

impl CredentialResolver {
    /// Creates a resolver over injected collaborators.
    ///
    /// # Arguments
    /// * `store` - Credential store queried for listings and secrets
    /// * `permissions` - Decides whether a context may see the catalog
    ///
    /// # Returns
    /// A resolver that can be cloned cheaply across requests
    pub fn new(store: Arc<dyn CredentialStore>, permissions: Arc<dyn PermissionChecker>) -> Self {
        Self { store, permissions }
    }

    /// Credentials the principal may choose from.
    ///
    /// Unauthorized callers get only `current_selection` (when non-blank), so
    /// an existing value still renders without leaking the catalog. A store
    /// fault degrades to the same list.
    pub async fn list(
        &self,
        context: &PermissionContext,
        current_selection: &str,
    ) -> Vec<CredentialChoice> {
        let mut choices = ChoiceList::default();

        if !can_view_credentials(self.permissions.as_ref(), context) {
            debug!(
                principal = context.principal.name(),
                "Credential catalog hidden from principal"
            );
            choices.include_current(current_selection);
            return choices.0;
        }

        let visible = match self
            .store
            .list_credentials(CredentialKind::UsernamePassword, context.scope.as_ref())
            .await
        {
            Ok(visible) => visible,
            Err(e) => {
                warn!("Failed to list credentials, showing current selection only: {}", e);
                choices.include_current(current_selection);
                return choices.0;
            }
        };

        choices.push(CredentialChoice::none());
        for reference in &visible {
            choices.push(CredentialChoice::from(reference));
        }
        choices.include_current(current_selection);
        choices.0
    }

    /// Inline check that a selected id still exists and is visible.
    ///
    /// Blank ids are valid. Callers who cannot see the catalog always get
    /// success, as does a store fault.
    pub async fn validate(
        &self,
        context: &PermissionContext,
        credential_id: &str,
    ) -> ValidationOutcome {
        if !can_view_credentials(self.permissions.as_ref(), context) {
            return ValidationOutcome::ok();
        }

        if is_blank(credential_id) {
            return ValidationOutcome::ok();
        }

        match self
            .store
            .list_credentials(CredentialKind::UsernamePassword, context.scope.as_ref())
            .await
        {
            Ok(visible) if visible.iter().any(|r| r.id == credential_id) => {
                ValidationOutcome::ok()
            }
            Ok(_) => ValidationOutcome::failure(CREDENTIAL_NOT_FOUND_MESSAGE),
            Err(e) => {
                warn!("Could not validate credential selection: {}", e);
                ValidationOutcome::ok()
            }
        }
    }

    /// Secret for a connection attempt.
    ///
    /// A blank id means no credential and yields `Ok(None)`.
    ///
    /// # Errors
    /// Returns `CredentialNotFound` for an unknown non-blank id, or the
    /// store's error if it cannot be queried
    pub async fn resolve(&self, credential_id: &str) -> Result<Option<Credentials>> {
        if is_blank(credential_id) {
            return Ok(None);
        }

        match self.store.resolve(credential_id).await? {
            Some(credentials) => Ok(Some(credentials)),
            None => Err(PgFingerprintError::credential_not_found(credential_id)),
        }
    }
}
