//! Liveness and bookkeeping handlers with no reaction of their own:
//! `ping`/`pong` keep a connection's rate-limit window warm, while
//! `newConnection`/`connectionEstablished` exist in the routing table purely
//! as a fallback for the case their real correlation already consumed the
//! signal via a reaction.

use std::sync::Arc;

use primitives::{IncomeSignal, NetworkSignal, SignalType};
use telemetry::debug;

use crate::context::NodeContext;

/// Answers a liveness probe with an empty `Pong`.
#[tracing::instrument(skip(ctx, signal), fields(peer = %signal.from))]
pub(crate) async fn ping(ctx: Arc<NodeContext>, signal: IncomeSignal) {
    let _ = ctx
        .interactions
        .send(&signal.from, NetworkSignal::new(SignalType::Pong, vec![]));
}

/// A `Pong` carries no follow-up of its own; receiving one just confirms the
/// peer is alive.
#[tracing::instrument(skip(ctx, signal), fields(peer = %signal.from))]
pub(crate) async fn pong(ctx: Arc<NodeContext>, signal: IncomeSignal) {
    let _ = ctx;
    debug!(peer = %signal.from, "pong received");
}

/// A bare `NewConnection` announcement reaching the dispatcher means the
/// transport admitted a peer through some path other than
/// [`crate::Node::accept_connection`] — the real registration glue. There is
/// nothing left to do here but note it.
#[tracing::instrument(skip(ctx, signal), fields(peer = %signal.from))]
pub(crate) async fn new_connection(ctx: Arc<NodeContext>, signal: IncomeSignal) {
    let _ = ctx;
    debug!(peer = %signal.from, "newConnection observed with no pending reaction");
}

/// Ordinarily consumed by the quorum coordinator's reaction in
/// [`crate::handlers::connect_with_other`]; reaching this fallback means that
/// reaction had already expired or fired by the time this confirmation
/// arrived.
#[tracing::instrument(skip(ctx, signal), fields(peer = %signal.from))]
pub(crate) async fn connection_established(ctx: Arc<NodeContext>, signal: IncomeSignal) {
    let _ = ctx;
    debug!(peer = %signal.from, "connectionEstablished observed with no pending reaction");
}
