//! ECDSA P-256 keypair generation, signing and verification, plus PEM
//! encode/decode matching the `EC PRIVATE KEY` / `PUBLIC KEY` labels the
//! original node persists its identity keys as.

use ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature as EcdsaSignature, SigningKey, VerifyingKey};
use p256::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use p256::sec1::{DecodeEcPrivateKey, EncodeEcPrivateKey};
use p256::SecretKey;
use rand::rngs::OsRng;

use crate::digest::sha256;

use super::CryptoError;

/// Alias so callers outside this module don't need to know about
/// `p256::ecdsa::VerifyingKey` vs. `p256::PublicKey`.
pub type PublicKey = VerifyingKey;

/// An ECDSA P-256 identity keypair.
#[derive(Clone)]
pub struct EcdsaKeyPair {
    signing_key: SigningKey,
}

impl EcdsaKeyPair {
    /// Generates a fresh P-256 keypair.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        *self.signing_key.verifying_key()
    }

    /// Signs the SHA-256 hash of `message` with this key, producing an
    /// ASN.1 DER-encoded (R, S) pair.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let hash = sha256(message);
        let sig: EcdsaSignature = self
            .signing_key
            .sign_prehash(&hash)
            .map_err(|e| CryptoError::Sign(e.to_string()))?;
        Ok(sig.to_der().as_bytes().to_vec())
    }

    /// Encodes the private key as a SEC1 `EC PRIVATE KEY` PEM block.
    pub fn to_pem(&self) -> Result<String, CryptoError> {
        let secret: SecretKey = self.signing_key.clone().into();
        secret
            .to_sec1_pem(LineEnding::LF)
            .map(|z| z.to_string())
            .map_err(|e| CryptoError::PemEncode(e.to_string()))
    }

    /// Decodes a SEC1 `EC PRIVATE KEY` PEM block.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        let secret = SecretKey::from_sec1_pem(pem)
            .map_err(|e| CryptoError::PemDecode(e.to_string()))?;
        Ok(Self {
            signing_key: secret.into(),
        })
    }
}

/// Verifies an ASN.1 DER-encoded (R, S) signature over the SHA-256 hash of
/// `message` against `public_key`.
pub fn verify(public_key: &VerifyingKey, message: &[u8], der_signature: &[u8]) -> bool {
    let Ok(sig) = EcdsaSignature::from_der(der_signature) else {
        return false;
    };
    let hash = sha256(message);
    public_key.verify_prehash(&hash, &sig).is_ok()
}

/// Encodes a verifying (public) key as a PKIX `PUBLIC KEY` PEM block.
pub fn public_key_to_pem(key: &VerifyingKey) -> Result<String, CryptoError> {
    key.to_public_key_pem(LineEnding::LF)
        .map_err(|e| CryptoError::PemEncode(e.to_string()))
}

/// Decodes a PKIX `PUBLIC KEY` PEM block into a verifying key.
pub fn public_key_from_pem(pem: &str) -> Result<VerifyingKey, CryptoError> {
    VerifyingKey::from_public_key_pem(pem).map_err(|e| CryptoError::PemDecode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_round_trips() {
        let key = EcdsaKeyPair::generate();
        let sig = key.sign(b"hello").unwrap();
        assert!(verify(&key.verifying_key(), b"hello", &sig));
    }

    #[test]
    fn verify_rejects_tampered_message() {
        let key = EcdsaKeyPair::generate();
        let sig = key.sign(b"hello").unwrap();
        assert!(!verify(&key.verifying_key(), b"goodbye", &sig));
    }

    #[test]
    fn verify_rejects_garbage_signature() {
        let key = EcdsaKeyPair::generate();
        assert!(!verify(&key.verifying_key(), b"hello", b"not-asn1"));
    }

    #[test]
    fn private_key_pem_round_trips() {
        let key = EcdsaKeyPair::generate();
        let pem = key.to_pem().unwrap();
        let restored = EcdsaKeyPair::from_pem(&pem).unwrap();
        assert_eq!(
            key.verifying_key().to_encoded_point(true),
            restored.verifying_key().to_encoded_point(true)
        );
    }

    #[test]
    fn public_key_pem_round_trips() {
        let key = EcdsaKeyPair::generate();
        let pem = public_key_to_pem(&key.verifying_key()).unwrap();
        let restored = public_key_from_pem(&pem).unwrap();
        assert_eq!(
            key.verifying_key().to_encoded_point(true),
            restored.to_encoded_point(true)
        );
    }
}
