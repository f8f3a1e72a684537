//! Cryptographic primitives: ECDSA P-256 sign/verify and RSA-OAEP
//! encrypt/decrypt, plus the PEM/DER codecs both key types are persisted
//! and transmitted in.

mod ecdsa_keys;
mod rsa_keys;

pub use ecdsa_keys::{
    public_key_from_pem as ecdsa_public_key_from_pem, public_key_to_pem as ecdsa_public_key_to_pem,
    verify as ecdsa_verify, EcdsaKeyPair, PublicKey as EcdsaPublicKey,
};
pub use rsa_keys::{
    generate_rsa_keypair,
    public_key_from_pem as rsa_public_key_from_pem,
    public_key_to_pem as rsa_public_key_to_pem,
    RsaKeyPair,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("failed to generate key: {0}")]
    KeyGeneration(String),

    #[error("failed to encode key as PEM: {0}")]
    PemEncode(String),

    #[error("failed to decode key from PEM: {0}")]
    PemDecode(String),

    #[error("ECDSA signing failed: {0}")]
    Sign(String),

    #[error("ECDSA signature did not verify")]
    VerifyFailed,

    #[error("invalid ASN.1 DER signature: {0}")]
    InvalidSignature(String),

    #[error("RSA-OAEP encryption failed: {0}")]
    Encrypt(String),

    #[error("RSA-OAEP decryption failed: {0}")]
    Decrypt(String),
}
