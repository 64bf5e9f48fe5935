//! Callback payload signing.
//!
//! The platform stamps every outgoing callback payload with an RSA
//! signature so relying applications can trust data delivered over an
//! unauthenticated browser redirect. Signing is a pure local computation;
//! a private key that fails to parse is a fatal configuration error at
//! construction, never a runtime condition.

use crate::error::{SigningError, SigningResult};
use jsonwebtoken::{crypto, Algorithm, EncodingKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hash algorithms the signer can be configured with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// SHA-256
    #[serde(rename = "SHA256")]
    Sha256,
    /// SHA-384
    #[serde(rename = "SHA384")]
    Sha384,
    /// SHA-512
    #[serde(rename = "SHA512")]
    Sha512,
}

impl FromStr for HashAlgorithm {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SHA256" | "SHA-256" => Ok(HashAlgorithm::Sha256),
            "SHA384" | "SHA-384" => Ok(HashAlgorithm::Sha384),
            "SHA512" | "SHA-512" => Ok(HashAlgorithm::Sha512),
            other => Err(SigningError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// RSA padding schemes the signer can be configured with.
///
/// PKCS#1 v1.5 is deterministic; PSS is randomized. Callers must not
/// assume byte-for-byte reproducible signatures under PSS.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaddingMode {
    /// RSASSA-PKCS1-v1_5, how the platform signs callback payloads.
    #[serde(rename = "Pkcs1")]
    Pkcs1,
    /// RSASSA-PSS with MGF1.
    #[serde(rename = "Pss")]
    Pss,
}

impl FromStr for PaddingMode {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pkcs1" | "PKCS1" | "Pkcs1v15" => Ok(PaddingMode::Pkcs1),
            "Pss" | "PSS" => Ok(PaddingMode::Pss),
            other => Err(SigningError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Configuration for the payload signer.
#[derive(Debug, Clone)]
pub struct SignerConfig {
    /// RSA private key in PEM form.
    pub private_key_pem: String,

    /// Hash algorithm for signatures.
    pub hash_algorithm: HashAlgorithm,

    /// RSA padding scheme.
    pub padding: PaddingMode,

    /// Identifier of the matching published public key, returned with
    /// every signature so verifiers know which cached key to use.
    pub public_key_id: String,
}

impl SignerConfig {
    /// Resolve the concrete signing algorithm for this configuration.
    pub fn algorithm(&self) -> Algorithm {
        match (self.padding, self.hash_algorithm) {
            (PaddingMode::Pkcs1, HashAlgorithm::Sha256) => Algorithm::RS256,
            (PaddingMode::Pkcs1, HashAlgorithm::Sha384) => Algorithm::RS384,
            (PaddingMode::Pkcs1, HashAlgorithm::Sha512) => Algorithm::RS512,
            (PaddingMode::Pss, HashAlgorithm::Sha256) => Algorithm::PS256,
            (PaddingMode::Pss, HashAlgorithm::Sha384) => Algorithm::PS384,
            (PaddingMode::Pss, HashAlgorithm::Sha512) => Algorithm::PS512,
        }
    }
}

/// A signature over a callback payload.
///
/// Carries the key id of the published public key that verifies it; the
/// algorithm is the one recorded against that key id at signing time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DigitalSignature {
    /// Identifier of the verification key.
    pub key_id: String,

    /// Base64url-encoded signature bytes.
    pub signature: String,
}

/// Signer for outgoing callback payloads.
///
/// # Example
///
/// ```rust,no_run
/// use handoff_signing::{HashAlgorithm, PaddingMode, PayloadSigner, SignerConfig};
///
/// let config = SignerConfig {
///     private_key_pem: std::fs::read_to_string("signing-key.pem").unwrap(),
///     hash_algorithm: HashAlgorithm::Sha256,
///     padding: PaddingMode::Pkcs1,
///     public_key_id: "2024-01".to_string(),
/// };
///
/// let signer = PayloadSigner::new(config).unwrap();
/// let signature = signer.sign("callback payload").unwrap();
/// assert_eq!(signature.key_id, "2024-01");
/// ```
pub struct PayloadSigner {
    key_id: String,
    algorithm: Algorithm,
    encoding_key: EncodingKey,
}

impl fmt::Debug for PayloadSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadSigner")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm)
            .field("encoding_key", &"[REDACTED]")
            .finish()
    }
}

impl PayloadSigner {
    /// Create a signer from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the private key PEM does not parse.
    pub fn new(config: SignerConfig) -> SigningResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(config.private_key_pem.as_bytes())
            .map_err(|e| SigningError::ConfigError(format!("Invalid RSA private key: {e}")))?;

        Ok(Self {
            key_id: config.public_key_id.clone(),
            algorithm: config.algorithm(),
            encoding_key,
        })
    }

    /// Sign the UTF-8 bytes of `payload`.
    ///
    /// # Returns
    ///
    /// The signature together with the configured public key id
    pub fn sign(&self, payload: &str) -> SigningResult<DigitalSignature> {
        let signature = crypto::sign(payload.as_bytes(), &self.encoding_key, self.algorithm)
            .map_err(|e| SigningError::Internal(format!("Signing failed: {e}")))?;

        Ok(DigitalSignature {
            key_id: self.key_id.clone(),
            signature,
        })
    }

    /// The public key id stamped onto signatures.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PRIVATE_KEY_PEM: &str = include_str!("../tests/fixtures/test_signing_key.pem");

    fn test_config() -> SignerConfig {
        SignerConfig {
            private_key_pem: TEST_PRIVATE_KEY_PEM.to_string(),
            hash_algorithm: HashAlgorithm::Sha256,
            padding: PaddingMode::Pkcs1,
            public_key_id: "2024-01".to_string(),
        }
    }

    #[test]
    fn test_sign_returns_key_id_and_signature() {
        let signer = PayloadSigner::new(test_config()).unwrap();
        let signature = signer.sign("payload").unwrap();

        assert_eq!(signature.key_id, "2024-01");
        assert!(!signature.signature.is_empty());
    }

    #[test]
    fn test_pkcs1_signing_is_deterministic() {
        let signer = PayloadSigner::new(test_config()).unwrap();
        let a = signer.sign("same payload").unwrap();
        let b = signer.sign("same payload").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_malformed_private_key_is_fatal() {
        let config = SignerConfig {
            private_key_pem: "not a pem".to_string(),
            ..test_config()
        };

        let result = PayloadSigner::new(config);
        assert!(matches!(result, Err(SigningError::ConfigError(_))));
    }

    #[test]
    fn test_algorithm_resolution() {
        let mut config = test_config();
        assert_eq!(config.algorithm(), Algorithm::RS256);

        config.hash_algorithm = HashAlgorithm::Sha512;
        assert_eq!(config.algorithm(), Algorithm::RS512);

        config.padding = PaddingMode::Pss;
        assert_eq!(config.algorithm(), Algorithm::PS512);
    }

    #[test]
    fn test_name_parsing() {
        assert_eq!("SHA256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("SHA-384".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha384);
        assert!("MD5".parse::<HashAlgorithm>().is_err());

        assert_eq!("Pkcs1".parse::<PaddingMode>().unwrap(), PaddingMode::Pkcs1);
        assert_eq!("PSS".parse::<PaddingMode>().unwrap(), PaddingMode::Pss);
        assert!("OAEP".parse::<PaddingMode>().is_err());
    }

    #[test]
    fn test_signature_wire_format_is_camel_case() {
        let signature = DigitalSignature {
            key_id: "2024-01".to_string(),
            signature: "c2ln".to_string(),
        };

        let json = serde_json::to_value(&signature).unwrap();
        assert_eq!(json["keyId"], "2024-01");
        assert_eq!(json["signature"], "c2ln");
    }
}
