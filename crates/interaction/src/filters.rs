//! The inbound filter chain, applied in order to every signal a peer's
//! connection produces before it reaches the dispatcher's shared inbox:
//! mute-until-verified, the offer gate, then the rate limiter. Any filter
//! that rejects a signal closes the peer's stream.

use primitives::wire::ID_LENGTH;
use primitives::{MemberId, NetworkSignal, SignalType};

use crate::interaction::Interaction;
use crate::state::InteractionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    Admit,
    Reject,
}

/// Runs the full chain, in spec order, against one inbound signal.
pub fn apply(self_id: &MemberId, from: &MemberId, interaction: &Interaction, signal: &NetworkSignal) -> FilterOutcome {
    if mute_until_verified(interaction, signal) == FilterOutcome::Reject {
        return FilterOutcome::Reject;
    }
    if offer_gate(self_id, from, interaction, signal) == FilterOutcome::Reject {
        return FilterOutcome::Reject;
    }
    rate_limit(interaction)
}

/// While `state == NotVerified`, every signal closes the stream except the
/// two types the admission handshake itself is built from: `DoVerify`
/// (the candidate's opening signal) and `TestChallenge` (its response to
/// the issued challenge). A candidate is registered in the table, still
/// `NotVerified`, before either of these arrives — any other type sent
/// ahead of verification is treated as abuse and closes the connection.
fn mute_until_verified(interaction: &Interaction, signal: &NetworkSignal) -> FilterOutcome {
    if interaction.state() != InteractionState::NotVerified {
        return FilterOutcome::Admit;
    }
    match signal.signal_type {
        SignalType::DoVerify | SignalType::TestChallenge => FilterOutcome::Admit,
        _ => FilterOutcome::Reject,
    }
}

/// While the peer is `NotConnected`, only a `SendOffer` addressed to this
/// peer and coming from an id on its `waitOffersList` is admitted. A
/// `NotVerified` peer's signal was already decided by the mute stage above
/// and passes through here unconditionally.
fn offer_gate(self_id: &MemberId, from: &MemberId, interaction: &Interaction, signal: &NetworkSignal) -> FilterOutcome {
    match interaction.state() {
        InteractionState::Connected | InteractionState::NotVerified => FilterOutcome::Admit,
        InteractionState::NotConnected | InteractionState::Disconnected => {
            if signal.signal_type != SignalType::SendOffer {
                return FilterOutcome::Reject;
            }
            if !interaction.is_awaiting_offer_from(from) {
                return FilterOutcome::Reject;
            }
            match parse_to_id(&signal.payload) {
                Some(to) if &to == self_id => FilterOutcome::Admit,
                _ => FilterOutcome::Reject,
            }
        }
    }
}

/// `RtcOffer` payloads open with `[to 52][from 52]...`; the offer gate
/// only needs the `to` field, at bytes `[idLength..2*idLength)`.
fn parse_to_id(payload: &[u8]) -> Option<MemberId> {
    payload
        .get(ID_LENGTH..2 * ID_LENGTH)
        .and_then(|bytes| MemberId::from_bytes(bytes).ok())
}

/// At most `MAX_MESSAGES_PER_MINUTE` admitted signals per rolling minute.
fn rate_limit(interaction: &Interaction) -> FilterOutcome {
    if interaction.record_message_and_check_rate_limit() {
        FilterOutcome::Admit
    } else {
        FilterOutcome::Reject
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    fn id(c: char) -> MemberId {
        MemberId::new(c.to_string().repeat(ID_LENGTH)).unwrap()
    }

    fn interaction() -> Interaction {
        let (tx, _rx) = mpsc::channel(4);
        Interaction::new(id('Z'), tx, Box::new(|| {}))
    }

    #[test]
    fn not_verified_peer_is_muted_for_unrelated_signals() {
        let interaction = interaction();
        let signal = NetworkSignal::new(SignalType::Ping, vec![]);
        assert_eq!(apply(&id('Z'), &id('A'), &interaction, &signal), FilterOutcome::Reject);
    }

    #[test]
    fn not_verified_peer_admits_do_verify() {
        let interaction = interaction();
        let signal = NetworkSignal::new(SignalType::DoVerify, vec![]);
        assert_eq!(apply(&id('Z'), &id('A'), &interaction, &signal), FilterOutcome::Admit);
    }

    #[test]
    fn not_verified_peer_admits_test_challenge() {
        let interaction = interaction();
        let signal = NetworkSignal::new(SignalType::TestChallenge, vec![]);
        assert_eq!(apply(&id('Z'), &id('A'), &interaction, &signal), FilterOutcome::Admit);
    }

    #[test]
    fn not_connected_peer_may_only_send_addressed_send_offer() {
        let interaction = interaction();
        interaction.cas(InteractionState::NotVerified, InteractionState::NotConnected);
        interaction.add_to_wait_offers_list(id('A'));

        let mut payload = Vec::new();
        payload.extend_from_slice(id('A').as_bytes());
        payload.extend_from_slice(id('Z').as_bytes());
        let signal = NetworkSignal::new(SignalType::SendOffer, payload);

        assert_eq!(apply(&id('Z'), &id('A'), &interaction, &signal), FilterOutcome::Admit);
    }

    #[test]
    fn not_connected_peer_send_offer_from_unexpected_sender_is_rejected() {
        let interaction = interaction();
        interaction.cas(InteractionState::NotVerified, InteractionState::NotConnected);

        let mut payload = Vec::new();
        payload.extend_from_slice(id('A').as_bytes());
        payload.extend_from_slice(id('Z').as_bytes());
        let signal = NetworkSignal::new(SignalType::SendOffer, payload);

        assert_eq!(apply(&id('Z'), &id('A'), &interaction, &signal), FilterOutcome::Reject);
    }

    #[test]
    fn not_connected_peer_other_signal_types_are_rejected() {
        let interaction = interaction();
        interaction.cas(InteractionState::NotVerified, InteractionState::NotConnected);
        let signal = NetworkSignal::new(SignalType::Ping, vec![]);
        assert_eq!(apply(&id('Z'), &id('A'), &interaction, &signal), FilterOutcome::Reject);
    }

    #[test]
    fn connected_peer_admits_any_signal_type() {
        let interaction = interaction();
        interaction.cas(InteractionState::NotVerified, InteractionState::Connected);
        let signal = NetworkSignal::new(SignalType::Ping, vec![]);
        assert_eq!(apply(&id('Z'), &id('A'), &interaction, &signal), FilterOutcome::Admit);
    }

    #[test]
    fn rate_limit_closes_stream_after_max_messages_per_minute() {
        let interaction = interaction();
        interaction.cas(InteractionState::NotVerified, InteractionState::Connected);
        let signal = NetworkSignal::new(SignalType::Ping, vec![]);

        for _ in 0..crate::MAX_MESSAGES_PER_MINUTE {
            assert_eq!(apply(&id('Z'), &id('A'), &interaction, &signal), FilterOutcome::Admit);
        }
        assert_eq!(apply(&id('Z'), &id('A'), &interaction, &signal), FilterOutcome::Reject);
    }
}
