//! # Handoff Signing
//!
//! This crate signs and verifies the callback payloads the handoff
//! platform delivers to relying applications over unauthenticated
//! browser redirects.
//!
//! ## Overview
//!
//! The handoff-signing crate handles:
//! - **PayloadSigner**: RSA signing of outgoing callback payloads
//! - **PayloadVerifier**: signature checks against published public keys
//! - **PublicKeyCache**: self-refreshing cache of verification keys
//! - **HttpKeyFetcher**: client for the `/v2/.well-known/keys` endpoint
//!
//! ## Flow
//!
//! The platform signs a callback payload with its current private key
//! and attaches the public key id. The relying application looks that
//! key id up through the cache (which refreshes from the well-known
//! endpoint when it sees an unknown id) and checks the signature before
//! trusting the payload.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use handoff_signing::{
//!     HashAlgorithm, HttpKeyFetcher, PaddingMode, PayloadSigner, PayloadVerifier,
//!     PublicKeyCache, PublicKeyCacheConfig, SignerConfig,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! async fn example(private_key_pem: String) {
//!     let signer = PayloadSigner::new(SignerConfig {
//!         private_key_pem,
//!         hash_algorithm: HashAlgorithm::Sha256,
//!         padding: PaddingMode::Pkcs1,
//!         public_key_id: "2024-01".to_string(),
//!     })
//!     .unwrap();
//!
//!     let signature = signer.sign("payload").unwrap();
//!
//!     let fetcher = HttpKeyFetcher::new("https://handoff.example.com", Duration::from_secs(5));
//!     let cache = PublicKeyCache::new(Arc::new(fetcher), PublicKeyCacheConfig::default());
//!     let verifier = PayloadVerifier::new(cache);
//!
//!     assert!(verifier.verify("payload", &signature).await.unwrap());
//! }
//! ```

pub mod cache;
pub mod client;
pub mod error;
pub mod keys;
pub mod signer;
pub mod verifier;

// Re-export main types
pub use cache::{PublicKeyCache, PublicKeyCacheConfig};
pub use client::{HttpKeyFetcher, KeyFetcher};
pub use error::{SigningError, SigningResult};
pub use keys::{KeyAlgorithm, PublicKeyEntry, PublishedKey, WellKnownKeys};
pub use signer::{DigitalSignature, HashAlgorithm, PaddingMode, PayloadSigner, SignerConfig};
pub use verifier::PayloadVerifier;
