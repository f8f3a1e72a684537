//! Mapping of member id to ECDSA public key. Read-heavy, rarely mutated:
//! membership only grows when an admission transaction commits.

use std::collections::HashMap;
use std::sync::RwLock;

use p256::ecdsa::VerifyingKey;
use primitives::MemberId;

use crate::ClusterError;

/// Read-mostly membership table shared across the node under one lock.
#[derive(Debug, Default)]
pub struct ClusterRegistry {
    members: RwLock<HashMap<MemberId, VerifyingKey>>,
}

impl ClusterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits `id` with its auth key. Called only when an admission
    /// transaction commits (see the quorum coordinator).
    pub fn insert(&self, id: MemberId, auth_key: VerifyingKey) {
        self.members
            .write()
            .expect("cluster registry lock poisoned")
            .insert(id, auth_key);
    }

    /// Returns the stored auth key for `id`, or `None` if it isn't a member.
    pub fn member_auth_key(&self, id: &MemberId) -> Option<VerifyingKey> {
        self.members
            .read()
            .expect("cluster registry lock poisoned")
            .get(id)
            .copied()
    }

    /// `true` if `id` is a known member, the admissibility check `doVerify`
    /// applies to a candidate before issuing a challenge.
    pub fn is_member(&self, id: &MemberId) -> bool {
        self.members
            .read()
            .expect("cluster registry lock poisoned")
            .contains_key(id)
    }

    /// Requires `id` to be a member, returning its auth key or
    /// [`ClusterError::NotAMember`].
    pub fn require_member_auth_key(&self, id: &MemberId) -> Result<VerifyingKey, ClusterError> {
        self.member_auth_key(id).ok_or(ClusterError::NotAMember)
    }

    pub fn size(&self) -> usize {
        self.members.read().expect("cluster registry lock poisoned").len()
    }

    pub fn remove(&self, id: &MemberId) {
        self.members
            .write()
            .expect("cluster registry lock poisoned")
            .remove(id);
    }
}

#[cfg(test)]
mod tests {
    use p256::ecdsa::SigningKey;
    use rand::rngs::OsRng;

    use super::*;

    fn id(c: char) -> MemberId {
        MemberId::new(c.to_string().repeat(52)).unwrap()
    }

    fn key() -> VerifyingKey {
        *SigningKey::random(&mut OsRng).verifying_key()
    }

    #[test]
    fn unknown_id_is_not_a_member() {
        let registry = ClusterRegistry::new();
        assert!(!registry.is_member(&id('A')));
        assert_eq!(registry.member_auth_key(&id('A')), None);
    }

    #[test]
    fn inserted_id_is_retrievable() {
        let registry = ClusterRegistry::new();
        let auth_key = key();
        registry.insert(id('A'), auth_key);
        assert!(registry.is_member(&id('A')));
        assert_eq!(registry.member_auth_key(&id('A')), Some(auth_key));
    }

    #[test]
    fn require_member_auth_key_rejects_unknown_id() {
        let registry = ClusterRegistry::new();
        assert_eq!(
            registry.require_member_auth_key(&id('A')),
            Err(ClusterError::NotAMember)
        );
    }

    #[test]
    fn size_reflects_membership_count() {
        let registry = ClusterRegistry::new();
        registry.insert(id('A'), key());
        registry.insert(id('B'), key());
        assert_eq!(registry.size(), 2);
    }

    #[test]
    fn remove_drops_membership() {
        let registry = ClusterRegistry::new();
        registry.insert(id('A'), key());
        registry.remove(&id('A'));
        assert!(!registry.is_member(&id('A')));
    }
}
