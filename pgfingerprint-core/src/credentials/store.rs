//! Credential store seam and an in-memory implementation.
//!
//! The store owns credential lifecycle. This crate only lists references and
//! resolves one id at a time for a probe.

use crate::error::PgFingerprintError;
use crate::security::{Credentials, Scope};
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

/// Kind of secret a credential holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialKind {
    /// Username plus password, the only kind a connection can use
    #[default]
    UsernamePassword,
    /// Single opaque token
    SecretText,
}

/// Listable view of a stored credential. Carries no secret material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRef {
    /// Opaque id stored in `credentialId`
    pub id: String,
    /// Kind of secret held
    pub kind: CredentialKind,
    /// Optional human label
    pub description: String,
    /// Owning scope, `None` for globally visible credentials
    pub scope: Option<Scope>,
}

impl CredentialRef {
    /// Creates a reference with no description, visible in every scope.
    pub fn new(id: impl Into<String>, kind: CredentialKind) -> Self {
        Self {
            id: id.into(),
            kind,
            description: String::new(),
            scope: None,
        }
    }

    /// Sets the label shown in selection lists.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Restricts visibility to `scope`.
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Label shown in selection lists.
    pub fn display_name(&self) -> &str {
        if self.description.is_empty() {
            &self.id
        } else {
            &self.description
        }
    }

    /// Global credentials are visible everywhere; scoped ones only in their scope.
    pub fn is_visible_in(&self, scope: Option<&Scope>) -> bool {
        match &self.scope {
            None => true,
            Some(owner) => scope == Some(owner),
        }
    }
}

/// External credential store.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Lists credentials of `kind` visible in `scope` (`None` for system scope).
    ///
    /// # Errors
    /// Returns error if the backing store cannot be queried
    async fn list_credentials(
        &self,
        kind: CredentialKind,
        scope: Option<&Scope>,
    ) -> Result<Vec<CredentialRef>>;

    /// Resolves a username/password credential by id.
    ///
    /// Returns `Ok(None)` when no such credential exists.
    ///
    /// # Errors
    /// Returns error if the backing store cannot be queried
    async fn resolve(&self, id: &str) -> Result<Option<Credentials>>;
}

struct StoredCredential {
    reference: CredentialRef,
    secret: Credentials,
}

/// Credential store held in memory.
///
/// Suitable for tests and the CLI, where entries are loaded from a JSON file.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    entries: Vec<StoredCredential>,
}

#[derive(Deserialize)]
struct CredentialEntry {
    id: String,
    #[serde(default)]
    kind: CredentialKind,
    #[serde(default)]
    description: String,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

impl InMemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry. Ids are expected to be unique.
    pub fn with_entry(mut self, reference: CredentialRef, secret: Credentials) -> Self {
        self.entries.push(StoredCredential { reference, secret });
        self
    }

    /// Adds a global username/password credential.
    pub fn with_username_password(
        self,
        id: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.with_entry(
            CredentialRef::new(id, CredentialKind::UsernamePassword),
            Credentials::new(username.into(), password.into()),
        )
    }

    /// Loads entries from a JSON array.
    ///
    /// ```json
    /// [{ "id": "pg", "description": "Fingerprint DB", "username": "jenkins", "password": "..." }]
    /// ```
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| PgFingerprintError::Io {
            context: format!("Failed to read credentials file {}", path.display()),
            source: e,
        })?;
        Self::from_json_str(&raw).map_err(|e| PgFingerprintError::Serialization {
            context: format!("Invalid credentials file {}", path.display()),
            source: e,
        })
    }

    fn from_json_str(raw: &str) -> std::result::Result<Self, serde_json::Error> {
        let entries: Vec<CredentialEntry> = serde_json::from_str(raw)?;
        let store = entries.into_iter().fold(Self::new(), |store, entry| {
            let mut reference =
                CredentialRef::new(entry.id, entry.kind).with_description(entry.description);
            if let Some(scope) = entry.scope {
                reference = reference.with_scope(Scope::new(scope));
            }
            store.with_entry(reference, Credentials::new(entry.username, entry.password))
        });
        Ok(store)
    }

    /// Number of stored entries, of any kind.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn list_credentials(
        &self,
        kind: CredentialKind,
        scope: Option<&Scope>,
    ) -> Result<Vec<CredentialRef>> {
        Ok(self
            .entries
            .iter()
            .map(|entry| &entry.reference)
            .filter(|reference| reference.kind == kind && reference.is_visible_in(scope))
            .cloned()
            .collect())
    }

    async fn resolve(&self, id: &str) -> Result<Option<Credentials>> {
        Ok(self
            .entries
            .iter()
            .find(|entry| {
                entry.reference.id == id && entry.reference.kind == CredentialKind::UsernamePassword
            })
            .map(|entry| entry.secret.clone()))
    }
}
