//! Security primitives: secret containers and the permission seam.
//!
//! - `credentials`: username/password container with automatic memory zeroing
//! - `permission`: capabilities, permission contexts and the disclosure rule
//!
//! # Security Guarantees
//! - Secrets are stored in `Zeroizing` containers and redacted from `Debug`
//! - Authorization decisions come from an injected `PermissionChecker`

mod credentials;
mod permission;

pub use credentials::Credentials;
pub use permission::{
    Capability, GrantTable, PermissionChecker, PermissionContext, Principal, Scope,
    can_view_credentials,
};
