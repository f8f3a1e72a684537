//! Owns every live [`Interaction`], wires a newly admitted connection into
//! the filter chain, and exposes the fan-out/lookup operations handlers use.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use primitives::{IncomeSignal, MemberId, NetworkSignal};
use telemetry::NodeMetrics;
use tokio::sync::mpsc;

use crate::connection::Connection;
use crate::filters::{self, FilterOutcome};
use crate::interaction::{DisconnectHook, Interaction};
use crate::state::InteractionState;
use crate::{InteractionError, OUTBOUND_SINK_CAPACITY};

/// The node's own id, needed by the offer gate to check a `SendOffer`'s
/// `to` field against itself.
pub struct InteractionTable {
    self_id: MemberId,
    interactions: RwLock<HashMap<MemberId, Arc<Interaction>>>,
    metrics: Arc<NodeMetrics>,
}

impl InteractionTable {
    pub fn new(self_id: MemberId, metrics: Arc<NodeMetrics>) -> Self {
        Self {
            self_id,
            interactions: RwLock::new(HashMap::new()),
            metrics,
        }
    }

    /// Registers `conn`, spawning the task that pumps its inbound stream
    /// through the filter chain into `inbox`. Returns the interaction id
    /// for convenience.
    pub fn add(
        self: &Arc<Self>,
        conn: Arc<dyn Connection>,
        inbox: mpsc::Sender<IncomeSignal>,
        disconnect_hook: DisconnectHook,
    ) -> MemberId {
        let id = conn.id();
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_SINK_CAPACITY);
        let interaction = Arc::new(Interaction::new(id.clone(), outbound_tx, disconnect_hook));

        self.interactions
            .write()
            .expect("interaction table lock poisoned")
            .insert(id.clone(), interaction.clone());

        let table = self.clone();
        let from = id.clone();
        tokio::spawn(async move {
            let mut inbound = conn.interact(outbound_rx).await;
            while let Some(signal) = inbound.recv().await {
                match filters::apply(&table.self_id, &from, &interaction, &signal) {
                    FilterOutcome::Admit => {
                        if inbox.send(IncomeSignal::new(from.clone(), signal)).await.is_err() {
                            break;
                        }
                    }
                    FilterOutcome::Reject => {
                        table.metrics.record_filter_rejection();
                        break;
                    }
                }
            }
            table.disconnect(&from);
        });

        id
    }

    pub fn get(&self, id: &MemberId) -> Option<Arc<Interaction>> {
        self.interactions
            .read()
            .expect("interaction table lock poisoned")
            .get(id)
            .cloned()
    }

    /// Snapshot-iterates every live interaction under the shared lock.
    pub fn range_all(&self, mut f: impl FnMut(&Arc<Interaction>)) {
        for interaction in self
            .interactions
            .read()
            .expect("interaction table lock poisoned")
            .values()
        {
            f(interaction);
        }
    }

    pub fn cas(&self, id: &MemberId, old: InteractionState, new: InteractionState) -> bool {
        self.get(id).is_some_and(|i| i.cas(old, new))
    }

    /// Non-blocking send to `id`'s outbound sink; on backpressure,
    /// disconnects the peer per the low-throughput policy.
    pub fn send(&self, id: &MemberId, signal: NetworkSignal) -> Result<(), InteractionError> {
        let interaction = self.get(id).ok_or(InteractionError::UnknownPeer)?;
        if interaction.send(signal).is_err() {
            self.disconnect(id);
            return Err(InteractionError::BackpressureExceeded);
        }
        Ok(())
    }

    /// Best-effort fan-out to every member's sink; a peer whose sink is
    /// full is disconnected, the rest are unaffected.
    pub fn broadcast(&self, signal: NetworkSignal) {
        let ids: Vec<MemberId> = self
            .interactions
            .read()
            .expect("interaction table lock poisoned")
            .keys()
            .cloned()
            .collect();

        for id in ids {
            let _ = self.send(&id, signal.clone());
        }
    }

    /// Best-effort fan-out to every member except `exclude`.
    pub fn broadcast_except(&self, exclude: &MemberId, signal: NetworkSignal) {
        let ids: Vec<MemberId> = self
            .interactions
            .read()
            .expect("interaction table lock poisoned")
            .keys()
            .filter(|id| *id != exclude)
            .cloned()
            .collect();

        for id in ids {
            let _ = self.send(&id, signal.clone());
        }
    }

    /// Removes the record and fires its teardown hook. Idempotent: a
    /// second call on an already-removed id is a no-op.
    pub fn disconnect(&self, id: &MemberId) {
        let removed = self
            .interactions
            .write()
            .expect("interaction table lock poisoned")
            .remove(id);

        if let Some(interaction) = removed {
            interaction.fire_disconnect_hook();
            self.metrics.record_peer_disconnected();
        }
    }

    pub fn len(&self) -> usize {
        self.interactions.read().expect("interaction table lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
