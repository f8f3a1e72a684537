//! Shared types for the signaling and admission engine: member identifiers,
//! the wire-level signal envelope, the binary codec for structured payloads,
//! and the cryptographic primitives (ECDSA P-256, RSA-OAEP) the protocol
//! handlers build on.

pub mod crypto;
pub mod digest;
pub mod env;
pub mod id;
pub mod signal;
pub mod wire;

pub use crypto::{
    ecdsa_public_key_from_pem, ecdsa_public_key_to_pem, ecdsa_verify, generate_rsa_keypair,
    rsa_public_key_from_pem, rsa_public_key_to_pem, CryptoError, EcdsaKeyPair, EcdsaPublicKey,
    RsaKeyPair,
};
pub use digest::sha256;
pub use env::{get_environment, get_pretty_print_logs, Environment};
pub use id::MemberId;
pub use signal::{IncomeSignal, NetworkSignal, SignalType};
pub use wire::{ConnectionSign, RtcAnswer, RtcOffer, Signature, WireError};
