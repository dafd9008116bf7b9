//! Error types for session operations.

use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session-specific errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A value could not be converted into a session value
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A stored value does not have the requested shape
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl SessionError {
    pub(crate) fn serialization(key: &str, err: serde_json::Error) -> Self {
        Self::Serialization(format!("key '{}': {}", key, err))
    }

    pub(crate) fn deserialization(key: &str, err: serde_json::Error) -> Self {
        Self::Deserialization(format!("key '{}': {}", key, err))
    }
}
