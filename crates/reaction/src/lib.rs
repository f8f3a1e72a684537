//! Ephemeral, one-shot predicates used to correlate an asynchronous response
//! signal back to the in-flight protocol step that's waiting for it.
//!
//! A handler registers a reaction before sending the signal that will
//! provoke a response; the dispatcher offers every inbound signal to every
//! live reaction before routing it to its type handler. The first predicate
//! to return `true` consumes its entry.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use primitives::IncomeSignal;
use rand::Rng;

/// Opaque handle returned by `add`/`add_keyed`, usable to drop an entry
/// before its deadline (e.g. once a coordinator no longer cares about the
/// response).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReactionKey(String);

impl ReactionKey {
    fn random() -> Self {
        const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
        let mut rng = rand::thread_rng();
        let raw: String = (0..16)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        Self(raw)
    }
}

impl From<&str> for ReactionKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

type Predicate = Box<dyn Fn(&IncomeSignal) -> bool + Send + Sync>;

struct Entry {
    predicate: Predicate,
    deadline: Instant,
}

/// Registry of one-shot predicates, each with its own timeout.
#[derive(Default)]
pub struct ReactionRegistry {
    entries: Mutex<HashMap<ReactionKey, Entry>>,
}

impl ReactionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a predicate under a fresh random key, returning that key so
    /// the caller can drop the entry early.
    pub fn add<P>(&self, timeout: Duration, predicate: P) -> ReactionKey
    where
        P: Fn(&IncomeSignal) -> bool + Send + Sync + 'static,
    {
        self.add_keyed(ReactionKey::random(), timeout, predicate)
    }

    /// Registers a predicate under a caller-chosen key. Matching is always
    /// by predicate, not by key; the key exists only so the caller can
    /// `remove` the entry early (e.g. a quorum coordinator giving up on a
    /// stalled endorsement).
    pub fn add_keyed<P>(&self, key: ReactionKey, timeout: Duration, predicate: P) -> ReactionKey
    where
        P: Fn(&IncomeSignal) -> bool + Send + Sync + 'static,
    {
        let deadline = Instant::now() + timeout;
        self.entries.lock().expect("reaction lock poisoned").insert(
            key.clone(),
            Entry {
                predicate: Box::new(predicate),
                deadline,
            },
        );
        key
    }

    /// Removes an entry before its deadline, if still present.
    pub fn remove(&self, key: &ReactionKey) {
        self.entries.lock().expect("reaction lock poisoned").remove(key);
    }

    /// Offers `signal` to every live, non-expired predicate, removing any
    /// that return `true` or that have expired. Returns the number of
    /// predicates that matched.
    ///
    /// Holds the registry lock for the duration of the sweep: predicates
    /// must not call back into the registry or block on inbox consumption.
    pub fn poll(&self, signal: &IncomeSignal) -> usize {
        let mut entries = self.entries.lock().expect("reaction lock poisoned");
        let now = Instant::now();
        let mut matched = 0;

        entries.retain(|_, entry| {
            if entry.deadline <= now {
                return false;
            }
            if (entry.predicate)(signal) {
                matched += 1;
                return false;
            }
            true
        });

        matched
    }

    /// Removes entries whose deadline has elapsed without a match. Intended
    /// to be driven by a periodic background task; `poll` also enforces
    /// deadlines inline so correctness doesn't depend on the sweep cadence.
    pub fn sweep_expired(&self) {
        let mut entries = self.entries.lock().expect("reaction lock poisoned");
        let now = Instant::now();
        entries.retain(|_, entry| entry.deadline > now);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("reaction lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use primitives::signal::{NetworkSignal, SignalType};
    use primitives::MemberId;

    use super::*;

    fn id(c: char) -> MemberId {
        MemberId::new(c.to_string().repeat(52)).unwrap()
    }

    fn signal(signal_type: SignalType, payload: &[u8]) -> IncomeSignal {
        IncomeSignal::new(id('A'), NetworkSignal::new(signal_type, payload.to_vec()))
    }

    #[test]
    fn matching_predicate_is_consumed() {
        let registry = ReactionRegistry::new();
        registry.add(Duration::from_secs(1), |s| s.signal_type() == SignalType::Pong);

        assert_eq!(registry.poll(&signal(SignalType::Pong, &[])), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn non_matching_predicate_survives() {
        let registry = ReactionRegistry::new();
        registry.add(Duration::from_secs(1), |s| s.signal_type() == SignalType::Pong);

        assert_eq!(registry.poll(&signal(SignalType::Ping, &[])), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn expired_entry_is_dropped_without_match() {
        let registry = ReactionRegistry::new();
        registry.add(Duration::from_millis(0), |_| true);
        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(registry.poll(&signal(SignalType::Ping, &[])), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_drops_entry_before_match() {
        let registry = ReactionRegistry::new();
        let key = registry.add(Duration::from_secs(1), |_| true);
        registry.remove(&key);
        assert!(registry.is_empty());
    }

    #[test]
    fn invocation_count_reflects_every_call_not_just_the_winning_one() {
        let registry = ReactionRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        registry.add(Duration::from_secs(1), move |s| {
            calls_clone.fetch_add(1, Ordering::Relaxed);
            s.signal_type() == SignalType::Pong
        });

        registry.poll(&signal(SignalType::Ping, &[]));
        registry.poll(&signal(SignalType::Pong, &[]));

        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }
}
