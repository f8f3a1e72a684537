//! The WebRTC signaling handlers: `generateConnectionSign` (an existing
//! member endorsing a candidate), `makeOffer` (the candidate building and
//! sending its SDP offer to that endorser) and `handleOffer` (the endorser
//! answering it). Together these move a candidate from holding a quorum of
//! endorsements to having a live, encrypted-SDP-negotiated data channel
//! with each endorser.

use std::sync::Arc;

use primitives::wire::SIGN_LENGTH;
use primitives::{
    rsa_public_key_from_pem, rsa_public_key_to_pem, ConnectionSign, IncomeSignal, MemberId,
    NetworkSignal, RsaKeyPair, RtcAnswer, RtcOffer, SignalType,
};
use rand::RngCore;
use telemetry::{debug, warn};
use webrtc_capability::{SessionDescription, WebRtcCapability, DATA_CHANNEL_LABEL};

use crate::context::NodeContext;
use crate::handlers::{WAIT_OFFER_TIMEOUT, WAIT_RTC_ANSWER_TIMEOUT};

/// A fresh, admission-scoped correlation token. Wire-width is
/// [`SIGN_LENGTH`] (256 bytes); only the leading bytes carry entropy, the
/// remainder is implicitly zero, matching the fixed-width field the codec
/// expects — correctness depends only on byte-for-byte equality, never on
/// the token's contents being interpreted as text.
fn random_sign() -> [u8; SIGN_LENGTH] {
    let mut sign = [0u8; SIGN_LENGTH];
    rand::thread_rng().fill_bytes(&mut sign);
    sign
}

/// Endorser side. Triggered by a `GenerateConnectionSign` signal relayed
/// from the admitting node's quorum coordinator, payload = candidate id.
#[tracing::instrument(skip(ctx, signal), fields(relay = %signal.from))]
pub(crate) async fn generate_connection_sign(ctx: Arc<NodeContext>, signal: IncomeSignal) {
    let Ok(candidate) = MemberId::from_bytes(signal.payload()) else {
        debug!("GenerateConnectionSign payload was not a valid member id; dropping");
        return;
    };

    let rsa_key_pair = match primitives::generate_rsa_keypair() {
        Ok(key_pair) => key_pair,
        Err(error) => {
            warn!(%error, "failed to generate this admission's RSA keypair");
            return;
        }
    };
    let rsa_pub_key_pem = match rsa_public_key_to_pem(&rsa_key_pair.public_key()) {
        Ok(pem) => pem.into_bytes(),
        Err(error) => {
            warn!(%error, "failed to encode this admission's RSA public key");
            return;
        }
    };

    let sign = random_sign();
    let rsa_key_pair = Arc::new(rsa_key_pair);

    let relay = signal.from.clone();
    let ctx_for_reaction = ctx.clone();
    let candidate_for_reaction = candidate.clone();
    ctx.reactions.add(WAIT_OFFER_TIMEOUT, move |next: &IncomeSignal| {
        if next.signal_type() != SignalType::HandleOffer || next.from != relay {
            return false;
        }
        let Ok(offer) = RtcOffer::unmarshal(next.payload()) else {
            return false;
        };
        if offer.from != candidate_for_reaction || offer.sign != sign {
            return false;
        }

        let ctx = ctx_for_reaction.clone();
        let rsa_key_pair = rsa_key_pair.clone();
        tokio::spawn(async move {
            handle_offer(ctx, rsa_key_pair, offer).await;
        });

        true
    });

    let connection_sign = ConnectionSign {
        to: candidate.clone(),
        from: ctx.self_id.clone(),
        stun_server: ctx.stun_server.clone(),
        rsa_pub_key_pem,
        sign,
    };

    if let Err(error) = ctx
        .interactions
        .send(&candidate, NetworkSignal::new(SignalType::SendConnectionSign, connection_sign.marshal()))
    {
        debug!(%candidate, %error, "could not deliver SendConnectionSign");
    }
}

/// Candidate side. Triggered by a `MakeOffer` signal carrying the
/// `ConnectionSign` an endorser issued for this candidate.
#[tracing::instrument(skip(ctx, signal))]
pub(crate) async fn make_offer(ctx: Arc<NodeContext>, signal: IncomeSignal) {
    let Ok(connection_sign) = ConnectionSign::unmarshal(signal.payload()) else {
        debug!("MakeOffer payload did not decode as a ConnectionSign; dropping");
        return;
    };

    let peer_connection = match ctx.webrtc.new_connection(vec![connection_sign.stun_server.clone()]).await {
        Ok(pc) => pc,
        Err(error) => {
            warn!(%error, "failed to create peer connection for makeOffer");
            return;
        }
    };

    if let Err(error) = peer_connection.create_data_channel(DATA_CHANNEL_LABEL).await {
        warn!(%error, "failed to create data channel");
        let _ = peer_connection.close().await;
        return;
    }

    let offer = match peer_connection.create_offer().await {
        Ok(offer) => offer,
        Err(error) => {
            warn!(%error, "failed to create offer");
            let _ = peer_connection.close().await;
            return;
        }
    };

    if let Err(error) = peer_connection.set_local_description(offer.clone()).await {
        warn!(%error, "failed to set local description");
        let _ = peer_connection.close().await;
        return;
    }

    let local_rsa = match primitives::generate_rsa_keypair() {
        Ok(key_pair) => key_pair,
        Err(error) => {
            warn!(%error, "failed to generate this offer's RSA keypair");
            let _ = peer_connection.close().await;
            return;
        }
    };
    let local_rsa_pub_pem = match rsa_public_key_to_pem(&local_rsa.public_key()) {
        Ok(pem) => pem.into_bytes(),
        Err(error) => {
            warn!(%error, "failed to encode this offer's RSA public key");
            let _ = peer_connection.close().await;
            return;
        }
    };

    let relay = signal.from.clone();
    let endorser = connection_sign.from.clone();
    let sign = connection_sign.sign;
    let self_id = ctx.self_id.clone();
    let local_rsa = Arc::new(local_rsa);
    let reaction_pc = peer_connection.clone();
    ctx.reactions.add(WAIT_RTC_ANSWER_TIMEOUT, move |next: &IncomeSignal| {
        if next.signal_type() != SignalType::HandleAnswer || next.from != relay {
            return false;
        }
        let Ok(answer) = RtcAnswer::unmarshal(next.payload()) else {
            return false;
        };
        if answer.to != self_id || answer.from != endorser {
            return false;
        }

        let local_rsa = local_rsa.clone();
        let pc = reaction_pc.clone();
        let remote_sd = answer.remote_sd.clone();
        tokio::spawn(async move {
            let Ok(plaintext) = local_rsa.decrypt(&remote_sd) else {
                warn!("failed to decrypt answer SDP");
                let _ = pc.close().await;
                return;
            };
            let Ok(sd) = SessionDescription::from_json_bytes(&plaintext) else {
                warn!("failed to decode answer SDP JSON");
                let _ = pc.close().await;
                return;
            };
            if let Err(error) = pc.set_remote_description(sd).await {
                warn!(%error, "failed to set remote description from answer");
                let _ = pc.close().await;
            }
        });

        true
    });

    let Ok(endorser_pub_key) = rsa_public_key_from_pem(&String::from_utf8_lossy(&connection_sign.rsa_pub_key_pem))
    else {
        warn!("endorser's RSA public key failed to parse");
        let _ = peer_connection.close().await;
        return;
    };
    let encrypted_sdp = match RsaKeyPair::encrypt(&endorser_pub_key, &offer.to_json_bytes()) {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(%error, "failed to encrypt offer SDP for endorser");
            let _ = peer_connection.close().await;
            return;
        }
    };

    let rtc_offer = RtcOffer {
        to: connection_sign.from,
        from: ctx.self_id.clone(),
        sign,
        rsa_pub_key_pem: local_rsa_pub_pem,
        remote_sd: encrypted_sdp,
    };

    if let Err(error) = ctx
        .interactions
        .send(&signal.from, NetworkSignal::new(SignalType::SendOffer, rtc_offer.marshal()))
    {
        debug!(%error, "could not deliver SendOffer");
    }
}

/// Endorser side, answering the offer correlated by `generateConnectionSign`'s
/// reaction. `rsa_key_pair` is the RSA identity that endorsement generated;
/// its private half decrypts `offer.remote_sd`.
async fn handle_offer(ctx: Arc<NodeContext>, rsa_key_pair: Arc<RsaKeyPair>, offer: RtcOffer) {
    let peer_connection = match ctx.webrtc.new_connection(vec![ctx.stun_server.clone()]).await {
        Ok(pc) => pc,
        Err(error) => {
            warn!(%error, "failed to create peer connection for handleOffer");
            return;
        }
    };

    let Ok(plaintext) = rsa_key_pair.decrypt(&offer.remote_sd) else {
        warn!("failed to decrypt offer SDP");
        let _ = peer_connection.close().await;
        return;
    };
    let Ok(remote_sd) = SessionDescription::from_json_bytes(&plaintext) else {
        warn!("failed to decode offer SDP JSON");
        let _ = peer_connection.close().await;
        return;
    };

    if let Err(error) = peer_connection.set_remote_description(remote_sd).await {
        warn!(%error, "failed to set remote description from offer");
        let _ = peer_connection.close().await;
        return;
    }

    let answer = match peer_connection.create_answer().await {
        Ok(answer) => answer,
        Err(error) => {
            warn!(%error, "failed to create answer");
            let _ = peer_connection.close().await;
            return;
        }
    };

    if let Err(error) = peer_connection.set_local_description(answer.clone()).await {
        warn!(%error, "failed to set local description for answer");
        let _ = peer_connection.close().await;
        return;
    }

    if let Err(error) = peer_connection.gathering_complete_promise().await {
        warn!(%error, "ICE gathering failed");
        let _ = peer_connection.close().await;
        return;
    }

    let Ok(offerer_pub_key) = rsa_public_key_from_pem(&String::from_utf8_lossy(&offer.rsa_pub_key_pem)) else {
        warn!("offerer's RSA public key failed to parse");
        let _ = peer_connection.close().await;
        return;
    };
    let encrypted_sdp = match RsaKeyPair::encrypt(&offerer_pub_key, &answer.to_json_bytes()) {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(%error, "failed to encrypt answer SDP for offerer");
            let _ = peer_connection.close().await;
            return;
        }
    };

    let rtc_answer = RtcAnswer {
        to: offer.from.clone(),
        from: ctx.self_id.clone(),
        remote_sd: encrypted_sdp,
    };

    if let Err(error) = ctx
        .interactions
        .send(&offer.from, NetworkSignal::new(SignalType::SendAnswer, rtc_answer.marshal()))
    {
        debug!(%error, "could not deliver SendAnswer");
    }
}
