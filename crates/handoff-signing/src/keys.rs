//! Published key material and cached verification keys.
//!
//! The platform publishes its current signing keys on a well-known
//! endpoint as RSA modulus/exponent components. This module defines the
//! wire shape of that listing and the materialized verification-key entry
//! the cache serves to verifiers.

use crate::error::{SigningError, SigningResult};
use jsonwebtoken::{Algorithm, DecodingKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Signing algorithms the platform publishes against its keys.
///
/// All are RSASSA-PKCS1-v1_5; they differ only in hash function.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyAlgorithm {
    /// RSASSA-PKCS1-v1_5 using SHA-256
    RS256,
    /// RSASSA-PKCS1-v1_5 using SHA-384
    RS384,
    /// RSASSA-PKCS1-v1_5 using SHA-512
    RS512,
}

impl KeyAlgorithm {
    /// Map to the concrete verification algorithm.
    pub fn jwt_algorithm(self) -> Algorithm {
        match self {
            KeyAlgorithm::RS256 => Algorithm::RS256,
            KeyAlgorithm::RS384 => Algorithm::RS384,
            KeyAlgorithm::RS512 => Algorithm::RS512,
        }
    }
}

impl FromStr for KeyAlgorithm {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RS256" => Ok(KeyAlgorithm::RS256),
            "RS384" => Ok(KeyAlgorithm::RS384),
            "RS512" => Ok(KeyAlgorithm::RS512),
            other => Err(SigningError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAlgorithm::RS256 => f.write_str("RS256"),
            KeyAlgorithm::RS384 => f.write_str("RS384"),
            KeyAlgorithm::RS512 => f.write_str("RS512"),
        }
    }
}

/// A single key as published on `GET <base>/v2/.well-known/keys`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedKey {
    /// Key identifier.
    pub kid: String,

    /// RSA modulus, Base64URL encoded.
    pub n: String,

    /// RSA public exponent, Base64URL encoded.
    pub e: String,

    /// Algorithm name (e.g. `RS256`).
    pub alg: String,

    /// Advertised expiry as unix seconds.
    pub ed: i64,
}

impl PublishedKey {
    /// Check whether this key's advertised expiry has passed.
    pub fn is_expired(&self, now_unix: i64) -> bool {
        self.ed <= now_unix
    }
}

/// The full well-known keys listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellKnownKeys {
    /// Published keys, newest first.
    pub keys: Vec<PublishedKey>,
}

/// A cached, materialized verification key.
///
/// Immutable once constructed. The cache retains the same entry object
/// across refreshes for keys that are still published, so the decoded
/// key material is built at most once per key id.
pub struct PublicKeyEntry {
    /// Key identifier.
    pub key_id: String,

    /// Algorithm published against this key.
    pub algorithm: KeyAlgorithm,

    /// Advertised expiry as unix seconds.
    pub expires_at: i64,

    /// Verification key built from the published modulus and exponent.
    pub decoding_key: DecodingKey,
}

impl fmt::Debug for PublicKeyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKeyEntry")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl PublicKeyEntry {
    /// Materialize a verification key from a published key.
    ///
    /// # Errors
    ///
    /// * `UnsupportedAlgorithm` if the published algorithm name is not in
    ///   the supported set (a data error in the listing, not a soft miss)
    /// * `InvalidKey` if the modulus/exponent components are malformed
    pub fn from_published(published: &PublishedKey) -> SigningResult<Self> {
        let algorithm = published.alg.parse::<KeyAlgorithm>()?;

        let decoding_key = DecodingKey::from_rsa_components(&published.n, &published.e)
            .map_err(|e| {
                SigningError::InvalidKey(format!(
                    "Key '{}' has invalid modulus/exponent: {e}",
                    published.kid
                ))
            })?;

        Ok(Self {
            key_id: published.kid.clone(),
            algorithm,
            expires_at: published.ed,
            decoding_key,
        })
    }
}
