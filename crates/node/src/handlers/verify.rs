//! Admission handshake: `doVerify` (verifier side) and `solveChallenge`
//! (candidate side).

use std::sync::Arc;

use interaction::InteractionState;
use primitives::{IncomeSignal, NetworkSignal, SignalType};
use telemetry::{debug, warn};

use crate::context::NodeContext;
use crate::handlers::{connect_with_other, CHALLENGE_REACTION_TIMEOUT};

/// Verifier side of admission. `signal.from` is the candidate. Requires the
/// candidate's id to already be a known cluster member (pre-provisioned
/// membership) before issuing a challenge.
#[tracing::instrument(skip(ctx, signal), fields(candidate = %signal.from))]
pub(crate) async fn do_verify(ctx: Arc<NodeContext>, signal: IncomeSignal) {
    let candidate = signal.from.clone();

    let Some(auth_key) = ctx.cluster.member_auth_key(&candidate) else {
        debug!(%candidate, "doVerify from an id outside the cluster registry; dropping");
        return;
    };

    let challenge_value = ctx.challenger.challenge(candidate.clone(), auth_key);

    let reaction_ctx = ctx.clone();
    let reaction_candidate = candidate.clone();
    ctx.reactions.add(CHALLENGE_REACTION_TIMEOUT, move |signal: &IncomeSignal| {
        if signal.from != reaction_candidate || signal.signal_type() != SignalType::TestChallenge {
            return false;
        }

        if reaction_ctx.challenger.test(&reaction_candidate, signal.payload()) {
            if reaction_ctx
                .interactions
                .cas(&reaction_candidate, InteractionState::NotVerified, InteractionState::NotConnected)
            {
                let spawn_ctx = reaction_ctx.clone();
                let spawn_candidate = reaction_candidate.clone();
                tokio::spawn(async move {
                    connect_with_other(spawn_ctx, spawn_candidate).await;
                });
            }
        } else {
            debug!(candidate = %reaction_candidate, "challenge response failed verification");
            reaction_ctx.interactions.disconnect(&reaction_candidate);
        }

        true
    });

    let _ = ctx
        .interactions
        .send(&candidate, NetworkSignal::new(SignalType::SolveChallenge, challenge_value));
}

/// Candidate side of admission: sign the issued challenge and send the
/// signature back for the verifier to check.
#[tracing::instrument(skip(ctx, signal), fields(verifier = %signal.from))]
pub(crate) async fn solve_challenge(ctx: Arc<NodeContext>, signal: IncomeSignal) {
    let verifier = signal.from.clone();

    match ctx.auth_key.sign(signal.payload()) {
        Ok(der_signature) => {
            let _ = ctx
                .interactions
                .send(&verifier, NetworkSignal::new(SignalType::TestChallenge, der_signature));
        }
        Err(error) => warn!(%error, "failed to sign challenge payload"),
    }
}
