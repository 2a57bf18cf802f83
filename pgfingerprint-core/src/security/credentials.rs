//! Username/password secret with automatic memory zeroing.
//!
//! # Security
//! - Both halves live in `Zeroizing<String>` containers
//! - Memory is cleared when the value goes out of scope
//! - `Debug` output never shows the password

use zeroize::{Zeroize, Zeroizing};

/// Resolved username/password pair, held only for the duration of one probe.
///
/// # Example
///
/// ```rust
/// use pgfingerprint_core::security::Credentials;
///
/// let creds = Credentials::new("jenkins".to_string(), "s3cret".to_string());
/// assert_eq!(creds.username(), "jenkins");
/// assert!(!format!("{:?}", creds).contains("s3cret"));
/// ```
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Credentials {
    username: Zeroizing<String>,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Takes ownership of both halves and wraps them for zeroing.
    ///
    /// # Arguments
    /// * `username` - Database user
    /// * `password` - Secret; cleared from memory on drop
    pub fn new(username: String, password: String) -> Self {
        Self {
            username: Zeroizing::new(username),
            password: Zeroizing::new(password),
        }
    }

    /// Database user name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Exposes the password to the driver. Never log the returned value.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Checks if a non-empty password is present without exposing it.
    pub fn has_password(&self) -> bool {
        !self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username())
            .field("password", &"****")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_new() {
        let creds = Credentials::new("testuser".to_string(), "testpass".to_string());
        assert_eq!(creds.username(), "testuser");
        assert_eq!(creds.password(), "testpass");
        assert!(creds.has_password());
    }

    #[test]
    fn test_credentials_empty_password() {
        let creds = Credentials::new("testuser".to_string(), String::new());
        assert!(!creds.has_password());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("admin".to_string(), "hunter2".to_string());
        let debug = format!("{:?}", creds);
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_credentials_clone() {
        let creds1 = Credentials::new("user".to_string(), "pass".to_string());
        let creds2 = creds1.clone();
        assert_eq!(creds1.username(), creds2.username());
        assert_eq!(creds1.password(), creds2.password());
    }
}
