//! Protocol handlers (C8): `doVerify`, `solveChallenge`, the quorum
//! coordinator `connectWithOther`, `generateConnectionSign`, `makeOffer`,
//! plus the liveness and bookkeeping handlers `ping`/`pong`/`newConnection`/
//! `connectionEstablished`.
//!
//! `TestChallenge`, `HandleOffer` and `HandleAnswer` carry no entry in
//! [`build_handler_map`] — each is consumed entirely by a reaction the
//! triggering handler registers (`doVerify`, `generateConnectionSign` and
//! `makeOffer` respectively). A signal of one of these types that arrives
//! with no outstanding reaction (already consumed, or its correlation
//! expired) is simply dropped by the dispatcher's "no handler registered"
//! fallback, which is the correct outcome: there is nothing left waiting
//! for it.

mod connect;
mod misc;
mod rtc;
mod verify;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dispatcher::{handler, HandlerMap};
use primitives::SignalType;

use crate::context::NodeContext;

/// Verification reaction TTL: how long a candidate has to answer its issued
/// challenge with `TestChallenge` before `doVerify`'s reaction expires.
pub(crate) const CHALLENGE_REACTION_TIMEOUT: Duration = Duration::from_secs(3);

/// How long the quorum coordinator waits for endorsers to answer
/// `GenerateConnectionSign` with `SendConnectionSign`.
pub(crate) const WAITING_SIGN_TIMEOUT: Duration = Duration::from_secs(30);

/// How long the quorum coordinator waits for the candidate to confirm each
/// endorsed data channel with `ConnectionEstablished`.
pub(crate) const WAITING_CONNECTION_ESTABLISHING_TIMEOUT: Duration = Duration::from_secs(30);

/// How long an endorser's `generateConnectionSign` waits for the candidate's
/// `HandleOffer` response correlated by `sign`.
pub(crate) const WAIT_OFFER_TIMEOUT: Duration = Duration::from_secs(30);

/// How long an offerer's `makeOffer` waits for the endorser's `HandleAnswer`
/// response correlated by `sign`.
pub(crate) const WAIT_RTC_ANSWER_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the static `SignalType -> Handler` routing table the dispatcher
/// consults after its reaction pass.
pub fn build_handler_map(ctx: Arc<NodeContext>) -> HandlerMap {
    let mut handlers: HandlerMap = HashMap::new();

    handlers.insert(SignalType::DoVerify, {
        let ctx = ctx.clone();
        handler(move |signal| {
            let ctx = ctx.clone();
            async move { verify::do_verify(ctx, signal).await }
        })
    });

    handlers.insert(SignalType::SolveChallenge, {
        let ctx = ctx.clone();
        handler(move |signal| {
            let ctx = ctx.clone();
            async move { verify::solve_challenge(ctx, signal).await }
        })
    });

    handlers.insert(SignalType::GenerateConnectionSign, {
        let ctx = ctx.clone();
        handler(move |signal| {
            let ctx = ctx.clone();
            async move { rtc::generate_connection_sign(ctx, signal).await }
        })
    });

    handlers.insert(SignalType::MakeOffer, {
        let ctx = ctx.clone();
        handler(move |signal| {
            let ctx = ctx.clone();
            async move { rtc::make_offer(ctx, signal).await }
        })
    });

    handlers.insert(SignalType::Ping, {
        let ctx = ctx.clone();
        handler(move |signal| {
            let ctx = ctx.clone();
            async move { misc::ping(ctx, signal).await }
        })
    });

    handlers.insert(SignalType::Pong, {
        let ctx = ctx.clone();
        handler(move |signal| {
            let ctx = ctx.clone();
            async move { misc::pong(ctx, signal).await }
        })
    });

    handlers.insert(SignalType::NewConnection, {
        let ctx = ctx.clone();
        handler(move |signal| {
            let ctx = ctx.clone();
            async move { misc::new_connection(ctx, signal).await }
        })
    });

    handlers.insert(SignalType::ConnectionEstablished, {
        let ctx = ctx.clone();
        handler(move |signal| {
            let ctx = ctx.clone();
            async move { misc::connection_established(ctx, signal).await }
        })
    });

    handlers
}

pub use connect::connect_with_other;
