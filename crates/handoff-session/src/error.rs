//! Error types for session storage operations

use thiserror::Error;

/// Session storage error types.
///
/// A missing or expired session is not an error; retrieval returns
/// `None` for those. Errors cover argument violations, corrupt stored
/// data, and backend failures, which propagate as-is because the session
/// store has no safe fallback.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A session key argument was empty.
    #[error("Session key must be a non-empty string")]
    EmptySessionKey,

    /// Session data failed an argument contract (e.g. empty client id).
    #[error("Invalid session data: {0}")]
    InvalidSessionData(String),

    /// Stored session data could not be deserialized. This indicates
    /// corruption, not a missing session.
    #[error("Stored session is corrupt: {0}")]
    DeserializationError(String),

    /// Session data could not be serialized for storage.
    #[error("Session serialization failed: {0}")]
    SerializationError(String),

    /// The distributed cache backend failed.
    #[error("Cache backend error: {0}")]
    CacheError(String),

    /// The distributed cache backend could not be reached.
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
}

/// Result type for session storage operations.
pub type SessionResult<T> = Result<T, SessionError>;

impl SessionError {
    /// Check if this error indicates corrupt stored data, as opposed to
    /// a backend or argument problem.
    pub fn is_data_corruption(&self) -> bool {
        matches!(self, SessionError::DeserializationError(_))
    }
}
