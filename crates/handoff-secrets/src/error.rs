//! Error types for secret encryption operations

use thiserror::Error;

/// Secret encryption error types.
///
/// These errors distinguish fatal configuration problems (a key of the
/// wrong length) from data-integrity failures (a blob that is malformed
/// or fails GCM authentication).
#[derive(Debug, Error)]
pub enum SecretError {
    /// The encryption key is not exactly 32 bytes.
    #[error("Invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Required key length in bytes.
        expected: usize,
        /// Length of the key that was supplied.
        actual: usize,
    },

    /// The encrypted blob is malformed (too short, or not valid base64
    /// inside an envelope).
    #[error("Invalid encrypted data: {0}")]
    InvalidEncryptedData(String),

    /// GCM authentication failed: the data was tampered with or
    /// encrypted under a different key.
    #[error("Authentication failed: ciphertext or tag does not verify")]
    AuthenticationFailure,

    /// Decrypted bytes are not valid UTF-8 (envelope operations only).
    #[error("Decrypted secret is not valid UTF-8")]
    InvalidUtf8,

    /// Encryption itself failed. This should not happen with a valid key
    /// and indicates an internal cipher error.
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),
}

/// Result type for secret encryption operations.
pub type SecretResult<T> = Result<T, SecretError>;

impl SecretError {
    /// Check if this error indicates tampered or corrupt data, as opposed
    /// to a configuration problem.
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            SecretError::InvalidEncryptedData(_)
                | SecretError::AuthenticationFailure
                | SecretError::InvalidUtf8
        )
    }
}
