//! Callback payload verification.
//!
//! Relying parties (and the platform's own internal verifier) check
//! callback signatures against the published public keys. The verifier
//! is a thin layer over the key cache: lookups drive the cache's refresh
//! policy, so a signature made with a freshly rotated key is verifiable
//! as soon as the key is published.

use crate::cache::PublicKeyCache;
use crate::error::{SigningError, SigningResult};
use crate::signer::DigitalSignature;
use jsonwebtoken::crypto;
use jsonwebtoken::errors::ErrorKind;
use tracing::debug;

/// Verifier for signed callback payloads.
///
/// Stateless apart from the injected key cache; `verify` never mutates
/// anything beyond the cache's own refresh side effects.
#[derive(Clone)]
pub struct PayloadVerifier {
    cache: PublicKeyCache,
}

impl PayloadVerifier {
    /// Create a verifier over the given key cache.
    pub fn new(cache: PublicKeyCache) -> Self {
        Self { cache }
    }

    /// Verify a signature over the UTF-8 bytes of `payload`.
    ///
    /// An unknown key id and a mismatching or malformed signature are all
    /// `Ok(false)`: expected outcomes, not errors. The platform signs
    /// with PKCS#1 v1.5, so verification uses the RS-family algorithm
    /// recorded against the cached key.
    ///
    /// # Errors
    ///
    /// Returns an error only for internal verification failures; bad
    /// input data never errors.
    pub async fn verify(&self, payload: &str, signature: &DigitalSignature) -> SigningResult<bool> {
        let Some(entry) = self.cache.get_key(&signature.key_id).await else {
            debug!(key_id = %signature.key_id, "No verification key cached for signature");
            return Ok(false);
        };

        let algorithm = entry.algorithm.jwt_algorithm();
        match crypto::verify(
            &signature.signature,
            payload.as_bytes(),
            &entry.decoding_key,
            algorithm,
        ) {
            Ok(valid) => Ok(valid),
            // A signature that is not even valid base64url cannot verify.
            Err(e) if matches!(e.kind(), ErrorKind::Base64(_)) => Ok(false),
            Err(e) => Err(SigningError::Internal(format!("Verification failed: {e}"))),
        }
    }
}
