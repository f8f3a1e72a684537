//! Short-lived per-id random challenges used by `doVerify` to confirm a
//! candidate holds the private key matching its registered auth key.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use p256::ecdsa::VerifyingKey;
use primitives::MemberId;
use rand::Rng;

const CHALLENGE_TTL: Duration = Duration::from_secs(5);
const CHALLENGE_LENGTH: usize = 26;

struct ChallengeEntry {
    value: Vec<u8>,
    pub_key: VerifyingKey,
    created_at: Instant,
}

/// Issues, and verifies exactly once, a random challenge per candidate id.
#[derive(Default)]
pub struct Challenger {
    entries: Mutex<HashMap<MemberId, ChallengeEntry>>,
}

impl Challenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh challenge for `id`, overwriting any prior one. The
    /// entry expires after [`CHALLENGE_TTL`] regardless of whether it was
    /// consumed.
    pub fn challenge(&self, id: MemberId, pub_key: VerifyingKey) -> Vec<u8> {
        let value = random_challenge_text();
        self.entries.lock().expect("challenger lock poisoned").insert(
            id,
            ChallengeEntry {
                value: value.clone(),
                pub_key,
                created_at: Instant::now(),
            },
        );
        value
    }

    /// Consumes the challenge for `id`, verifying `signature` (ASN.1 DER)
    /// over the SHA-256 hash of the stored challenge value. Returns `false`
    /// if no entry exists, the entry is stale, or verification fails.
    pub fn test(&self, id: &MemberId, signature: &[u8]) -> bool {
        let entry = self
            .entries
            .lock()
            .expect("challenger lock poisoned")
            .remove(id);

        let Some(entry) = entry else {
            return false;
        };

        if entry.created_at.elapsed() > CHALLENGE_TTL {
            return false;
        }

        primitives::ecdsa_verify(&entry.pub_key, &entry.value, signature)
    }

    /// Sweeps entries older than [`CHALLENGE_TTL`]. Intended to be driven by
    /// a periodic background task; `test` also enforces the TTL inline so
    /// correctness doesn't depend on the sweep cadence.
    pub fn sweep_expired(&self) {
        let mut entries = self.entries.lock().expect("challenger lock poisoned");
        entries.retain(|_, entry| entry.created_at.elapsed() <= CHALLENGE_TTL);
    }
}

fn random_challenge_text() -> Vec<u8> {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..CHALLENGE_LENGTH)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
        .collect()
}
