//! RSA-2048 keypair generation and RSA-OAEP-SHA256 encrypt/decrypt, used to
//! wrap the one-time challenge value exchanged during verification. Keys are
//! persisted as PKCS8 (`PRIVATE KEY`) / PKIX (`PUBLIC KEY`) PEM, matching the
//! label the ECDSA identity key uses.

use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use super::CryptoError;

/// Bit width of generated RSA keys.
const RSA_KEY_BITS: usize = 2048;

/// An RSA-2048 keypair used for OAEP encrypt/decrypt of challenge payloads.
#[derive(Clone)]
pub struct RsaKeyPair {
    private_key: RsaPrivateKey,
}

impl RsaKeyPair {
    pub fn public_key(&self) -> RsaPublicKey {
        self.private_key.to_public_key()
    }

    /// Encrypts `plaintext` with `public_key` under RSA-OAEP-SHA256.
    pub fn encrypt(public_key: &RsaPublicKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut rng = rand::thread_rng();
        public_key
            .encrypt(&mut rng, Oaep::new::<Sha256>(), plaintext)
            .map_err(|e| CryptoError::Encrypt(e.to_string()))
    }

    /// Decrypts `ciphertext` produced by [`RsaKeyPair::encrypt`] for this key.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.private_key
            .decrypt(Oaep::new::<Sha256>(), ciphertext)
            .map_err(|e| CryptoError::Decrypt(e.to_string()))
    }

    /// Encodes the private key as a PKCS8 `PRIVATE KEY` PEM block.
    pub fn to_pem(&self) -> Result<String, CryptoError> {
        self.private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map(|z| z.to_string())
            .map_err(|e| CryptoError::PemEncode(e.to_string()))
    }

    /// Decodes a PKCS8 `PRIVATE KEY` PEM block.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        let private_key =
            RsaPrivateKey::from_pkcs8_pem(pem).map_err(|e| CryptoError::PemDecode(e.to_string()))?;
        Ok(Self { private_key })
    }
}

/// Generates a fresh RSA-2048 keypair.
pub fn generate_rsa_keypair() -> Result<RsaKeyPair, CryptoError> {
    let mut rng = rand::thread_rng();
    let private_key = RsaPrivateKey::new(&mut rng, RSA_KEY_BITS)
        .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
    Ok(RsaKeyPair { private_key })
}

/// Encodes an RSA public key as a PKIX `PUBLIC KEY` PEM block.
pub fn public_key_to_pem(key: &RsaPublicKey) -> Result<String, CryptoError> {
    key.to_public_key_pem(LineEnding::LF)
        .map_err(|e| CryptoError::PemEncode(e.to_string()))
}

/// Decodes a PKIX `PUBLIC KEY` PEM block into an RSA public key.
pub fn public_key_from_pem(pem: &str) -> Result<RsaPublicKey, CryptoError> {
    RsaPublicKey::from_public_key_pem(pem).map_err(|e| CryptoError::PemDecode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_then_decrypt_round_trips() {
        let key = generate_rsa_keypair().unwrap();
        let ciphertext = RsaKeyPair::encrypt(&key.public_key(), b"challenge-value").unwrap();
        let plaintext = key.decrypt(&ciphertext).unwrap();
        assert_eq!(plaintext, b"challenge-value");
    }

    #[test]
    fn decrypt_fails_with_wrong_key() {
        let key = generate_rsa_keypair().unwrap();
        let other = generate_rsa_keypair().unwrap();
        let ciphertext = RsaKeyPair::encrypt(&key.public_key(), b"challenge-value").unwrap();
        assert!(other.decrypt(&ciphertext).is_err());
    }

    #[test]
    fn private_key_pem_round_trips() {
        let key = generate_rsa_keypair().unwrap();
        let pem = key.to_pem().unwrap();
        let restored = RsaKeyPair::from_pem(&pem).unwrap();
        assert_eq!(key.public_key(), restored.public_key());
    }

    #[test]
    fn public_key_pem_round_trips() {
        let key = generate_rsa_keypair().unwrap();
        let pem = public_key_to_pem(&key.public_key()).unwrap();
        let restored = public_key_from_pem(&pem).unwrap();
        assert_eq!(key.public_key(), restored);
    }
}
