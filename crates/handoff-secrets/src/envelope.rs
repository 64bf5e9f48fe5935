//! The `ENC:<version>:<base64>` storage envelope.
//!
//! Stored secret values come in two shapes: legacy plaintext written
//! before encryption-at-rest existed, and versioned encrypted envelopes.
//! [`StoredSecret`] models the distinction as a tagged variant so callers
//! never sniff string prefixes themselves.

use crate::cipher::{decrypt, encrypt, KEY_LENGTH};
use crate::error::{SecretError, SecretResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::fmt;

/// Envelope prefix for the version-0 scheme (AES-256-GCM).
const V0_PREFIX: &str = "ENC:0:";

/// A secret value as it appears in storage.
///
/// Parsing never fails: anything that does not match a recognized
/// envelope shape is a legacy plaintext value and is carried through
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredSecret {
    /// A legacy value stored before encryption-at-rest was introduced.
    Plaintext(String),

    /// A version-0 envelope: AES-256-GCM, `nonce ‖ tag ‖ ciphertext`.
    EncryptedV0(Vec<u8>),
}

impl StoredSecret {
    /// Parse a stored string into its envelope variant.
    ///
    /// A value starting with `ENC:0:` whose remainder is valid base64 is
    /// an encrypted envelope; everything else (including an `ENC:` value
    /// with an unknown version or broken base64) is treated as plaintext,
    /// matching how legacy values are read.
    pub fn parse(value: &str) -> Self {
        if let Some(encoded) = value.strip_prefix(V0_PREFIX) {
            if let Ok(blob) = BASE64.decode(encoded) {
                return StoredSecret::EncryptedV0(blob);
            }
        }
        StoredSecret::Plaintext(value.to_string())
    }

    /// Check whether this value is encrypted.
    pub fn is_encrypted(&self) -> bool {
        matches!(self, StoredSecret::EncryptedV0(_))
    }
}

impl fmt::Display for StoredSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredSecret::Plaintext(value) => f.write_str(value),
            StoredSecret::EncryptedV0(blob) => {
                write!(f, "{}{}", V0_PREFIX, BASE64.encode(blob))
            }
        }
    }
}

/// Cipher for relying-application API secrets.
///
/// Wraps the raw AES-256-GCM primitives with the storage envelope.
/// Re-encrypting a value always produces a new envelope (fresh nonce);
/// stored values are never mutated in place.
///
/// # Example
///
/// ```rust
/// use handoff_secrets::SecretCipher;
///
/// let cipher = SecretCipher::new(&[7u8; 32]).unwrap();
/// let stored = cipher.encrypt_value("s3cret").unwrap();
/// assert_eq!(cipher.decrypt_value(&stored).unwrap(), "s3cret");
/// ```
#[derive(Clone)]
pub struct SecretCipher {
    key: [u8; KEY_LENGTH],
}

impl fmt::Debug for SecretCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretCipher")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl SecretCipher {
    /// Create a cipher from a 32-byte key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKeyLength` if `key` is not exactly 32 bytes.
    pub fn new(key: &[u8]) -> SecretResult<Self> {
        if key.len() != KEY_LENGTH {
            return Err(SecretError::InvalidKeyLength {
                expected: KEY_LENGTH,
                actual: key.len(),
            });
        }
        let mut owned = [0u8; KEY_LENGTH];
        owned.copy_from_slice(key);
        Ok(Self { key: owned })
    }

    /// Encrypt a secret into a version-0 storage envelope.
    ///
    /// # Arguments
    ///
    /// * `secret` - The plaintext secret value
    ///
    /// # Returns
    ///
    /// An `ENC:0:<base64>` string suitable for storage
    pub fn encrypt_value(&self, secret: &str) -> SecretResult<String> {
        let blob = encrypt(&self.key, secret.as_bytes())?;
        Ok(StoredSecret::EncryptedV0(blob).to_string())
    }

    /// Decrypt a stored value.
    ///
    /// Legacy plaintext values (anything without the recognized envelope
    /// shape) are returned unchanged.
    ///
    /// # Errors
    ///
    /// * `InvalidEncryptedData` if an envelope's payload is malformed
    /// * `AuthenticationFailure` if the GCM tag does not verify
    /// * `InvalidUtf8` if the decrypted bytes are not valid UTF-8
    pub fn decrypt_value(&self, value: &str) -> SecretResult<String> {
        match StoredSecret::parse(value) {
            StoredSecret::Plaintext(plain) => Ok(plain),
            StoredSecret::EncryptedV0(blob) => {
                let plaintext = decrypt(&self.key, &blob)?;
                String::from_utf8(plaintext).map_err(|_| SecretError::InvalidUtf8)
            }
        }
    }
}
