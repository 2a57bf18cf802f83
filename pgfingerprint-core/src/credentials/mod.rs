//! Credential indirection.
//!
//! - `store`: the external credential store seam and an in-memory store
//! - `resolver`: permission-scoped listing, selection checks and resolution

mod resolver;
mod store;

pub use resolver::{
    CREDENTIAL_NOT_FOUND_MESSAGE, CredentialChoice, CredentialResolver, NONE_SELECTED_LABEL,
};
pub use store::{CredentialKind, CredentialRef, CredentialStore, InMemoryCredentialStore};
