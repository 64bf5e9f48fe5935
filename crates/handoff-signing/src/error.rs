//! Error types for signing and key-cache operations

use thiserror::Error;

/// Signing and verification error types.
///
/// Configuration errors (bad PEM, unrecognized algorithm names) are fatal
/// and surface at construction or first use. Fetch errors are transient;
/// the public key cache absorbs them and keeps serving previously cached
/// keys rather than propagating to lookups.
#[derive(Debug, Error)]
pub enum SigningError {
    /// Configuration is invalid (e.g. unparseable private key).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A published or configured algorithm name is not in the supported set.
    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Published key material could not be turned into a verification key.
    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    /// The well-known keys endpoint returned an empty listing.
    #[error("No keys found in the well-known keys listing")]
    NoKeysFound,

    /// The HTTP request to the well-known keys endpoint failed.
    #[error("Key listing request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The well-known keys endpoint returned a non-success status.
    #[error("Key listing endpoint returned status {0}")]
    UnexpectedStatus(u16),

    /// Internal signing or verification failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for signing operations.
pub type SigningResult<T> = Result<T, SigningError>;

impl SigningError {
    /// Check if this error is a transient fetch problem, as opposed to a
    /// fatal configuration or data error.
    ///
    /// Transient errors leave the key cache serving stale-but-valid data
    /// and are logged as warnings; fatal errors indicate the platform or
    /// the published key material is misconfigured.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SigningError::RequestFailed(_)
                | SigningError::UnexpectedStatus(_)
                | SigningError::NoKeysFound
        )
    }
}
