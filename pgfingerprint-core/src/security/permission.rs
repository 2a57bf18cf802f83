//! Permission seam between this subsystem and the host's authorization model.
//!
//! Authorization is a pure predicate injected at construction. Nothing here
//! queries global state.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Capabilities this subsystem asks the host about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// System administration
    Administer,
    /// Read an object's configuration, including its credential bindings
    ExtendedRead,
    /// Use credentials on behalf of an object
    UseCredentials,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Administer => write!(f, "administer"),
            Self::ExtendedRead => write!(f, "extended-read"),
            Self::UseCredentials => write!(f, "use-credentials"),
        }
    }
}

/// The acting user or service account.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal(String);

impl Principal {
    /// Creates a principal from its user name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// User name of the principal.
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// An object a configuration can belong to, such as a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope(String);

impl Scope {
    /// Creates a scope from the owning object's id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id of the owning object.
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Who is asking, and optionally on behalf of which object.
///
/// Used only to decide disclosure, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionContext {
    /// Acting principal
    pub principal: Principal,
    /// Owning object, `None` for system scope
    pub scope: Option<Scope>,
}

impl PermissionContext {
    /// Context for system-wide configuration.
    pub fn system(principal: Principal) -> Self {
        Self {
            principal,
            scope: None,
        }
    }

    /// Context for a configuration owned by `scope`.
    pub fn scoped(principal: Principal, scope: Scope) -> Self {
        Self {
            principal,
            scope: Some(scope),
        }
    }
}

/// Host permission system.
///
/// `scope` of `None` asks about the system as a whole.
pub trait PermissionChecker: Send + Sync {
    fn has_permission(
        &self,
        principal: &Principal,
        capability: Capability,
        scope: Option<&Scope>,
    ) -> bool;
}

impl<F> PermissionChecker for F
where
    F: Fn(&Principal, Capability, Option<&Scope>) -> bool + Send + Sync,
{
    fn has_permission(
        &self,
        principal: &Principal,
        capability: Capability,
        scope: Option<&Scope>,
    ) -> bool {
        self(principal, capability, scope)
    }
}

/// Whether the context may see the credential catalog.
///
/// Without a scope the principal must administer the system. With a scope it
/// needs extended read on that scope or the right to use credentials there.
pub fn can_view_credentials(checker: &dyn PermissionChecker, context: &PermissionContext) -> bool {
    let principal = &context.principal;
    match &context.scope {
        None => checker.has_permission(principal, Capability::Administer, None),
        Some(scope) => {
            checker.has_permission(principal, Capability::ExtendedRead, Some(scope))
                || checker.has_permission(principal, Capability::UseCredentials, Some(scope))
        }
    }
}

/// In-memory grant set.
///
/// A system-level `Administer` grant implies every capability everywhere.
/// Other system-level grants apply to every scope.
#[derive(Debug, Clone, Default)]
pub struct GrantTable {
    grants: HashMap<Principal, HashSet<(Capability, Option<Scope>)>>,
}

impl GrantTable {
    /// Creates a table with no grants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants `capability` system-wide.
    pub fn grant(mut self, principal: Principal, capability: Capability) -> Self {
        self.grants
            .entry(principal)
            .or_default()
            .insert((capability, None));
        self
    }

    /// Grants `capability` on a single scope.
    pub fn grant_on(mut self, principal: Principal, capability: Capability, scope: Scope) -> Self {
        self.grants
            .entry(principal)
            .or_default()
            .insert((capability, Some(scope)));
        self
    }
}

impl PermissionChecker for GrantTable {
    fn has_permission(
        &self,
        principal: &Principal,
        capability: Capability,
        scope: Option<&Scope>,
    ) -> bool {
        let Some(granted) = self.grants.get(principal) else {
            return false;
        };

        if granted.contains(&(Capability::Administer, None)) || granted.contains(&(capability, None))
        {
            return true;
        }

        scope.is_some_and(|scope| granted.contains(&(capability, Some(scope.clone()))))
    }
}
