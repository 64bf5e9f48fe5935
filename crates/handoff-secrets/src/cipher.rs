//! AES-256-GCM encryption primitives.
//!
//! This module implements the raw byte-level cipher used by the secret
//! envelope. Output layout is `nonce ‖ tag ‖ ciphertext` so a stored blob
//! is self-describing: the first 28 bytes are always the nonce and the
//! authentication tag.

use crate::error::{SecretError, SecretResult};
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use rand::RngCore;

/// Length of the AES-256 key in bytes.
pub const KEY_LENGTH: usize = 32;

/// Length of the GCM nonce in bytes.
pub const NONCE_LENGTH: usize = 12;

/// Length of the GCM authentication tag in bytes.
pub const TAG_LENGTH: usize = 16;

fn build_cipher(key: &[u8]) -> SecretResult<Aes256Gcm> {
    if key.len() != KEY_LENGTH {
        return Err(SecretError::InvalidKeyLength {
            expected: KEY_LENGTH,
            actual: key.len(),
        });
    }
    Aes256Gcm::new_from_slice(key)
        .map_err(|e| SecretError::EncryptionFailed(format!("Failed to create cipher: {e}")))
}

/// Encrypt `plaintext` under a 32-byte key using AES-256-GCM.
///
/// A fresh random 12-byte nonce is generated for every call, so encrypting
/// the same plaintext twice produces different blobs.
///
/// # Arguments
///
/// * `key` - 32-byte AES-256 key
/// * `plaintext` - Arbitrary bytes to encrypt
///
/// # Returns
///
/// `nonce ‖ tag ‖ ciphertext`
///
/// # Errors
///
/// Returns `InvalidKeyLength` if `key` is not exactly 32 bytes.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> SecretResult<Vec<u8>> {
    let cipher = build_cipher(key)?;

    let mut nonce_bytes = [0u8; NONCE_LENGTH];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from(nonce_bytes);

    // aes-gcm appends the tag to the ciphertext; split it back out so the
    // stored layout keeps the tag directly after the nonce.
    let sealed = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| SecretError::EncryptionFailed(format!("Encryption failed: {e}")))?;
    let (body, tag) = sealed.split_at(sealed.len() - TAG_LENGTH);

    let mut blob = Vec::with_capacity(NONCE_LENGTH + sealed.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(tag);
    blob.extend_from_slice(body);

    Ok(blob)
}

/// Decrypt a blob produced by [`encrypt`].
///
/// # Arguments
///
/// * `key` - 32-byte AES-256 key
/// * `blob` - `nonce ‖ tag ‖ ciphertext` bytes
///
/// # Returns
///
/// The recovered plaintext
///
/// # Errors
///
/// * `InvalidKeyLength` if `key` is not exactly 32 bytes
/// * `InvalidEncryptedData` if `blob` is shorter than nonce + tag (28 bytes)
/// * `AuthenticationFailure` if the GCM tag does not verify
pub fn decrypt(key: &[u8], blob: &[u8]) -> SecretResult<Vec<u8>> {
    let cipher = build_cipher(key)?;

    if blob.len() < NONCE_LENGTH + TAG_LENGTH {
        return Err(SecretError::InvalidEncryptedData(format!(
            "Blob is {} bytes, minimum is {}",
            blob.len(),
            NONCE_LENGTH + TAG_LENGTH
        )));
    }

    let (nonce_bytes, rest) = blob.split_at(NONCE_LENGTH);
    let (tag, body) = rest.split_at(TAG_LENGTH);

    // Rebuild the ciphertext ‖ tag layout the aead API expects.
    let mut sealed = Vec::with_capacity(body.len() + TAG_LENGTH);
    sealed.extend_from_slice(body);
    sealed.extend_from_slice(tag);

    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), sealed.as_ref())
        .map_err(|_| SecretError::AuthenticationFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; KEY_LENGTH] {
        [0x42; KEY_LENGTH]
    }

    #[test]
    fn test_round_trip() {
        let plaintext = b"per-application api secret";
        let blob = encrypt(&test_key(), plaintext).unwrap();
        let recovered = decrypt(&test_key(), &blob).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn test_round_trip_empty_plaintext() {
        let blob = encrypt(&test_key(), b"").unwrap();
        assert_eq!(blob.len(), NONCE_LENGTH + TAG_LENGTH);
        assert_eq!(decrypt(&test_key(), &blob).unwrap(), b"");
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let blob_a = encrypt(&test_key(), b"same input").unwrap();
        let blob_b = encrypt(&test_key(), b"same input").unwrap();
        assert_ne!(blob_a, blob_b);
    }

    #[test]
    fn test_invalid_key_length() {
        let result = encrypt(&[0u8; 16], b"data");
        assert!(matches!(
            result,
            Err(SecretError::InvalidKeyLength {
                expected: 32,
                actual: 16
            })
        ));

        let result = decrypt(&[0u8; 31], &[0u8; 64]);
        assert!(matches!(result, Err(SecretError::InvalidKeyLength { .. })));
    }

    #[test]
    fn test_blob_too_short() {
        let result = decrypt(&test_key(), &[0u8; 27]);
        assert!(matches!(result, Err(SecretError::InvalidEncryptedData(_))));
    }

    #[test]
    fn test_tampered_ciphertext_fails_authentication() {
        let mut blob = encrypt(&test_key(), b"sensitive value").unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x01;

        let result = decrypt(&test_key(), &blob);
        assert!(matches!(result, Err(SecretError::AuthenticationFailure)));
    }

    #[test]
    fn test_tampered_tag_fails_authentication() {
        let mut blob = encrypt(&test_key(), b"sensitive value").unwrap();
        // Byte 12 is the first tag byte.
        blob[NONCE_LENGTH] ^= 0x80;

        let result = decrypt(&test_key(), &blob);
        assert!(matches!(result, Err(SecretError::AuthenticationFailure)));
    }

    #[test]
    fn test_wrong_key_fails_authentication() {
        let blob = encrypt(&test_key(), b"sensitive value").unwrap();
        let result = decrypt(&[0x17; KEY_LENGTH], &blob);
        assert!(matches!(result, Err(SecretError::AuthenticationFailure)));
    }

    #[test]
    fn test_every_tampered_byte_is_rejected() {
        let blob = encrypt(&test_key(), b"abc").unwrap();
        for i in 0..blob.len() {
            let mut tampered = blob.clone();
            tampered[i] ^= 0xff;
            assert!(
                decrypt(&test_key(), &tampered).is_err(),
                "tampering byte {i} was not detected"
            );
        }
    }
}
