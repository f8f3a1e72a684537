//! The quorum-based admission coordinator: once a candidate clears the
//! verification handshake, `connectWithOther` broadcasts an endorsement
//! request to the rest of the cluster and waits for a quorum of them to
//! both hand the candidate a `ConnectionSign` and later confirm the
//! resulting data channel with `ConnectionEstablished`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use interaction::InteractionState;
use primitives::{IncomeSignal, MemberId, NetworkSignal, SignalType};
use telemetry::debug;
use tokio::sync::watch;

use crate::context::NodeContext;
use crate::handlers::{WAITING_CONNECTION_ESTABLISHING_TIMEOUT, WAITING_SIGN_TIMEOUT};

/// Races a latch against a timeout. Checks the current value first so a
/// latch that already fired before this call started is observed
/// immediately, rather than only on the next `changed()` edge.
async fn wait_latch(mut rx: watch::Receiver<bool>, timeout: Duration) -> bool {
    if *rx.borrow() {
        return true;
    }
    tokio::select! {
        result = rx.changed() => result.is_ok() && *rx.borrow(),
        _ = tokio::time::sleep(timeout) => false,
    }
}

/// Drives a freshly verified `candidate` through endorsement to full
/// admission. Spawned by `doVerify`'s reaction once the challenge response
/// checks out.
#[tracing::instrument(skip(ctx), fields(%candidate))]
pub(crate) async fn connect_with_other(ctx: Arc<NodeContext>, candidate: MemberId) {
    let req_conns = ctx.required_endorsements();

    // A cluster of one (a bootstrap/genesis node) can never produce a
    // matching `SendConnectionSign`; admit the candidate outright rather
    // than wait forever on a quorum of zero that nothing will ever satisfy.
    if req_conns == 0 {
        ctx.interactions
            .cas(&candidate, InteractionState::NotConnected, InteractionState::Connected);
        return;
    }

    let signs_provided = Arc::new(AtomicUsize::new(0));
    let confirmed_connections = Arc::new(AtomicUsize::new(0));
    let (signs_ready_tx, signs_ready_rx) = watch::channel(false);
    let (established_tx, established_rx) = watch::channel(false);
    let signs_ready_tx = Arc::new(signs_ready_tx);
    let established_tx = Arc::new(established_tx);

    ctx.interactions.broadcast_except(
        &candidate,
        NetworkSignal::new(SignalType::GenerateConnectionSign, candidate.as_bytes().to_vec()),
    );

    let sign_reaction_ctx = ctx.clone();
    let sign_reaction_candidate = candidate.clone();
    let signs_provided_for_reaction = signs_provided.clone();
    let signs_ready_tx_for_reaction = signs_ready_tx.clone();
    let signs_ready_rx_for_subtask = signs_ready_rx.clone();
    ctx.reactions.add(WAITING_SIGN_TIMEOUT, move |signal: &IncomeSignal| {
        if signal.signal_type() != SignalType::SendConnectionSign {
            return false;
        }
        if !signal.payload().starts_with(sign_reaction_candidate.as_bytes()) {
            return false;
        }

        let endorser = signal.from.clone();
        let payload = signal.payload().to_vec();
        let ctx = sign_reaction_ctx.clone();
        let candidate = sign_reaction_candidate.clone();
        let signs_ready_rx = signs_ready_rx_for_subtask.clone();
        tokio::spawn(async move {
            wait_latch(signs_ready_rx, WAITING_SIGN_TIMEOUT).await;
            if let Err(error) = ctx
                .interactions
                .send(&candidate, NetworkSignal::new(SignalType::MakeOffer, payload))
            {
                debug!(%endorser, %error, "could not forward MakeOffer to candidate");
            }
        });

        let provided = signs_provided_for_reaction.fetch_add(1, Ordering::SeqCst) + 1;
        if provided >= req_conns {
            let _ = signs_ready_tx_for_reaction.send(true);
        }

        // Keep listening until every endorser has checked in; only the
        // signal that completes the quorum consumes the reaction.
        provided >= req_conns
    });

    let established_reaction_candidate = candidate.clone();
    let confirmed_for_reaction = confirmed_connections.clone();
    let established_tx_for_reaction = established_tx.clone();
    ctx.reactions.add(WAITING_CONNECTION_ESTABLISHING_TIMEOUT, move |signal: &IncomeSignal| {
        if signal.signal_type() != SignalType::ConnectionEstablished {
            return false;
        }
        if signal.payload() != established_reaction_candidate.as_bytes() {
            return false;
        }

        let confirmed = confirmed_for_reaction.fetch_add(1, Ordering::SeqCst) + 1;
        if confirmed >= req_conns {
            let _ = established_tx_for_reaction.send(true);
        }

        confirmed >= req_conns
    });

    let established = wait_latch(established_rx, WAITING_CONNECTION_ESTABLISHING_TIMEOUT).await;

    if established {
        ctx.interactions
            .cas(&candidate, InteractionState::NotConnected, InteractionState::Connected);
    } else {
        debug!(%candidate, "admission quorum did not complete in time, disconnecting candidate");
        ctx.interactions.disconnect(&candidate);
        ctx.interactions
            .broadcast(NetworkSignal::new(SignalType::DisconnectCandidate, candidate.as_bytes().to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn wait_latch_observes_already_fired_value_without_racing_changed() {
        let (tx, rx) = watch::channel(true);
        drop(tx);
        assert!(wait_latch(rx, Duration::from_millis(50)).await);
    }

    #[tokio::test]
    async fn wait_latch_times_out_when_never_fired() {
        let (_tx, rx) = watch::channel(false);
        assert!(!wait_latch(rx, Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn wait_latch_wakes_on_late_fire() {
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            let _ = tx.send(true);
        });
        assert!(wait_latch(rx, Duration::from_millis(200)).await);
    }
}
