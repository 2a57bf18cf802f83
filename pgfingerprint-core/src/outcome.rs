//! Result type returned across the administrative boundary.
//!
//! Every operation exposed to the UI layer reports through
//! `ValidationOutcome`; raw errors never escape it.

use serde::Serialize;

/// Outcome of a field check or a connectivity test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum ValidationOutcome {
    /// The check passed; the message may be empty
    Success(String),
    /// The check failed for the stated reason
    Failure(String),
}

impl ValidationOutcome {
    /// Success without a message.
    pub fn ok() -> Self {
        Self::Success(String::new())
    }

    /// Success carrying a message for the operator.
    pub fn success(message: impl Into<String>) -> Self {
        Self::Success(message.into())
    }

    /// Failure with a user-facing reason.
    ///
    /// # Arguments
    /// * `message` - Reason shown verbatim; must not contain secrets
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    /// Returns `true` for `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Message of either variant; empty for a bare `ok()`.
    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Failure(message) => message,
        }
    }
}

impl std::fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success(message) if message.is_empty() => write!(f, "OK"),
            Self::Success(message) => write!(f, "OK: {}", message),
            Self::Failure(message) => write!(f, "ERROR: {}", message),
        }
    }
}
