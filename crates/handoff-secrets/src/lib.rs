//! # Handoff Secrets
//!
//! This crate provides versioned at-rest encryption for the API secrets
//! that relying applications register with the handoff platform.
//!
//! ## Overview
//!
//! The handoff-secrets crate handles:
//! - **SecretCipher**: AES-256-GCM encryption of raw byte secrets
//! - **Envelope**: the `ENC:<version>:<base64>` storage format
//! - **Legacy pass-through**: values without the envelope shape are
//!   treated as plaintext and returned unchanged
//!
//! ## Storage format
//!
//! An encrypted secret is stored as `ENC:0:<base64>` where the base64
//! payload decodes to `nonce ‖ tag ‖ ciphertext` (12-byte nonce, 16-byte
//! GCM tag). Version `0` is the only defined scheme; the version segment
//! exists so a future scheme can be introduced without rewriting stored
//! values.
//!
//! ## Usage
//!
//! ```rust
//! use handoff_secrets::SecretCipher;
//!
//! let cipher = SecretCipher::new(&[0x42; 32]).unwrap();
//!
//! let stored = cipher.encrypt_value("client-api-secret").unwrap();
//! assert!(stored.starts_with("ENC:0:"));
//!
//! let recovered = cipher.decrypt_value(&stored).unwrap();
//! assert_eq!(recovered, "client-api-secret");
//!
//! // Legacy unencrypted values pass through unchanged
//! assert_eq!(cipher.decrypt_value("legacy-secret").unwrap(), "legacy-secret");
//! ```

pub mod cipher;
pub mod envelope;
pub mod error;

// Re-export main types
pub use cipher::{decrypt, encrypt, KEY_LENGTH, NONCE_LENGTH, TAG_LENGTH};
pub use envelope::{SecretCipher, StoredSecret};
pub use error::{SecretError, SecretResult};
