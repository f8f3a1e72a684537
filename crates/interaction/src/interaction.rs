//! The per-peer record: identity, lifecycle state, the set of ids this peer
//! may offer a data channel to while unverified, its outbound sink and its
//! teardown hook.

use std::collections::HashSet;
use std::sync::{Mutex, RwLock};
use std::time::Instant;

use primitives::{MemberId, NetworkSignal};
use tokio::sync::mpsc;

use crate::state::InteractionState;
use crate::{InteractionError, MAX_MESSAGES_PER_MINUTE};

/// Hook invoked exactly once when a peer transitions to `Disconnected`,
/// tearing down whatever resources the owning connection holds.
pub type DisconnectHook = Box<dyn FnOnce() + Send>;

pub struct Interaction {
    id: MemberId,
    state: RwLock<InteractionState>,
    wait_offers_list: Mutex<HashSet<MemberId>>,
    outbound_tx: mpsc::Sender<NetworkSignal>,
    disconnect_hook: Mutex<Option<DisconnectHook>>,
    recent_message_times: Mutex<Vec<Instant>>,
}

impl Interaction {
    pub(crate) fn new(
        id: MemberId,
        outbound_tx: mpsc::Sender<NetworkSignal>,
        disconnect_hook: DisconnectHook,
    ) -> Self {
        Self {
            id,
            state: RwLock::new(InteractionState::NotVerified),
            wait_offers_list: Mutex::new(HashSet::new()),
            outbound_tx,
            disconnect_hook: Mutex::new(Some(disconnect_hook)),
            recent_message_times: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> &MemberId {
        &self.id
    }

    pub fn state(&self) -> InteractionState {
        *self.state.read().expect("interaction state lock poisoned")
    }

    /// Monotonic compare-and-swap: succeeds only if the current state
    /// equals `old` and `old -> new` moves forward in the lifecycle.
    pub fn cas(&self, old: InteractionState, new: InteractionState) -> bool {
        if !old.can_transition_to(new) {
            return false;
        }
        let mut state = self.state.write().expect("interaction state lock poisoned");
        if *state != old {
            return false;
        }
        *state = new;
        true
    }

    pub fn add_to_wait_offers_list(&self, from: MemberId) {
        self.wait_offers_list
            .lock()
            .expect("wait offers list lock poisoned")
            .insert(from);
    }

    pub fn is_awaiting_offer_from(&self, from: &MemberId) -> bool {
        self.wait_offers_list
            .lock()
            .expect("wait offers list lock poisoned")
            .contains(from)
    }

    /// Non-blocking send to this peer's outbound sink. On a full sink,
    /// returns [`InteractionError::BackpressureExceeded`]; the caller is
    /// expected to disconnect the peer (low-throughput policy).
    pub fn send(&self, signal: NetworkSignal) -> Result<(), InteractionError> {
        self.outbound_tx
            .try_send(signal)
            .map_err(|_| InteractionError::BackpressureExceeded)
    }

    /// Records one inbound message and reports whether the peer has stayed
    /// within `maxMessagesPerMinute` over the trailing 60-second window.
    pub fn record_message_and_check_rate_limit(&self) -> bool {
        let mut times = self
            .recent_message_times
            .lock()
            .expect("rate limit lock poisoned");
        let now = Instant::now();
        times.retain(|t| now.duration_since(*t).as_secs() < 60);
        times.push(now);
        times.len() <= MAX_MESSAGES_PER_MINUTE
    }

    /// Invokes the teardown hook exactly once.
    pub(crate) fn fire_disconnect_hook(&self) {
        if let Some(hook) = self
            .disconnect_hook
            .lock()
            .expect("disconnect hook lock poisoned")
            .take()
        {
            hook();
        }
    }
}
