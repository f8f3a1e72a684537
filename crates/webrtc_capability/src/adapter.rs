//! `WebrtcAdapter`: the native [`WebRtcCapability`] implementation, backed
//! by the `webrtc` crate's peer connection.

use std::sync::Arc;

use async_trait::async_trait;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::APIBuilder;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::RTCPeerConnection;

use crate::{SessionDescription, WebRtcCapability, WebRtcError};

/// Wraps a live `webrtc`-crate peer connection behind [`WebRtcCapability`].
pub struct WebrtcAdapter {
    peer_connection: Arc<RTCPeerConnection>,
}

/// Builds a fresh peer connection configured with `ice_servers` (typically
/// a single STUN URL supplied by the endorser).
pub async fn new_peer_connection(ice_servers: Vec<String>) -> Result<WebrtcAdapter, WebRtcError> {
    let mut media_engine = MediaEngine::default();
    media_engine
        .register_default_codecs()
        .map_err(|e| WebRtcError::PeerConnection(e.to_string()))?;

    let mut registry = Registry::new();
    registry = register_default_interceptors(registry, &mut media_engine)
        .map_err(|e| WebRtcError::PeerConnection(e.to_string()))?;

    let api = APIBuilder::new()
        .with_media_engine(media_engine)
        .with_interceptor_registry(registry)
        .build();

    let config = RTCConfiguration {
        ice_servers: vec![RTCIceServer {
            urls: ice_servers,
            ..Default::default()
        }],
        ..Default::default()
    };

    let peer_connection = api
        .new_peer_connection(config)
        .await
        .map_err(|e| WebRtcError::PeerConnection(e.to_string()))?;

    Ok(WebrtcAdapter {
        peer_connection: Arc::new(peer_connection),
    })
}

fn to_rtc_description(desc: SessionDescription) -> Result<RTCSessionDescription, WebRtcError> {
    match desc.sdp_type.as_str() {
        "offer" => RTCSessionDescription::offer(desc.sdp),
        "answer" => RTCSessionDescription::answer(desc.sdp),
        other => {
            return Err(WebRtcError::SetDescription(format!(
                "unsupported session description type: {other}"
            )))
        }
    }
    .map_err(|e| WebRtcError::SetDescription(e.to_string()))
}

fn from_rtc_description(desc: RTCSessionDescription) -> SessionDescription {
    let sdp_type = match desc.sdp_type {
        RTCSdpType::Offer => "offer",
        RTCSdpType::Answer => "answer",
        RTCSdpType::Pranswer => "pranswer",
        RTCSdpType::Rollback => "rollback",
        RTCSdpType::Unspecified => "unspecified",
    };
    SessionDescription {
        sdp_type: sdp_type.to_string(),
        sdp: desc.sdp,
    }
}

#[async_trait]
impl WebRtcCapability for WebrtcAdapter {
    async fn create_data_channel(&self, label: &str) -> Result<(), WebRtcError> {
        self.peer_connection
            .create_data_channel(label, None)
            .await
            .map_err(|e| WebRtcError::DataChannel(e.to_string()))?;
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription, WebRtcError> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(|e| WebRtcError::Negotiation(e.to_string()))?;
        Ok(from_rtc_description(offer))
    }

    async fn create_answer(&self) -> Result<SessionDescription, WebRtcError> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(|e| WebRtcError::Negotiation(e.to_string()))?;
        Ok(from_rtc_description(answer))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), WebRtcError> {
        let desc = to_rtc_description(desc)?;
        self.peer_connection
            .set_local_description(desc)
            .await
            .map_err(|e| WebRtcError::SetDescription(e.to_string()))
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), WebRtcError> {
        let desc = to_rtc_description(desc)?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .map_err(|e| WebRtcError::SetDescription(e.to_string()))
    }

    async fn gathering_complete_promise(&self) -> Result<(), WebRtcError> {
        // The channel closes (recv resolves to `None`) once gathering
        // finishes; that's the expected, successful path, not an error.
        let mut done = self.peer_connection.gathering_complete_promise().await;
        done.recv().await;
        Ok(())
    }

    async fn close(&self) -> Result<(), WebRtcError> {
        self.peer_connection
            .close()
            .await
            .map_err(|e| WebRtcError::PeerConnection(e.to_string()))
    }
}
