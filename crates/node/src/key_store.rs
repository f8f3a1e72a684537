//! Loads this node's ECDSA P-256 identity key from disk, generating and
//! persisting a fresh one the first time a node starts at a given config.

use std::path::Path;

use primitives::{ecdsa_public_key_from_pem, ecdsa_public_key_to_pem, EcdsaKeyPair, EcdsaPublicKey};

use crate::config::NodeConfig;
use crate::error::Result;

/// The node's own signing identity: an [`EcdsaKeyPair`] loaded from, or
/// generated and written to, the paths named in [`NodeConfig`].
pub struct FileKeyStore {
    key_pair: EcdsaKeyPair,
}

impl FileKeyStore {
    /// Loads the keypair at `config`'s key paths if both files exist;
    /// otherwise generates a fresh keypair and writes it to those paths.
    pub fn load_or_generate(config: &NodeConfig) -> Result<Self> {
        let private_path = &config.private_auth_key_path;
        let public_path = &config.public_auth_key_path;

        let key_pair = if private_path.exists() && public_path.exists() {
            Self::load(private_path, public_path)?
        } else {
            Self::generate_and_persist(private_path, public_path)?
        };

        Ok(Self { key_pair })
    }

    pub fn key_pair(&self) -> &EcdsaKeyPair {
        &self.key_pair
    }

    pub fn public_key(&self) -> EcdsaPublicKey {
        self.key_pair.verifying_key()
    }

    fn load(private_path: &Path, public_path: &Path) -> Result<EcdsaKeyPair> {
        let private_pem = std::fs::read_to_string(private_path)?;
        let key_pair = EcdsaKeyPair::from_pem(&private_pem)?;

        // The public key file is read only to confirm it matches the
        // private key it's meant to accompany; the signing key itself is
        // always derivable from the private half.
        let public_pem = std::fs::read_to_string(public_path)?;
        let on_disk_public = ecdsa_public_key_from_pem(&public_pem)?;
        if on_disk_public != key_pair.verifying_key() {
            return Err(crate::error::NodeError::Other(format!(
                "public auth key at {} does not match private auth key at {}",
                public_path.display(),
                private_path.display()
            )));
        }

        Ok(key_pair)
    }

    fn generate_and_persist(private_path: &Path, public_path: &Path) -> Result<EcdsaKeyPair> {
        let key_pair = EcdsaKeyPair::generate();

        if let Some(parent) = private_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if let Some(parent) = public_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(private_path, key_pair.to_pem()?)?;
        std::fs::write(public_path, ecdsa_public_key_to_pem(&key_pair.verifying_key())?)?;

        Ok(key_pair)
    }
}
