//! A thin capability trait over the WebRTC stack. Handlers build offers and
//! answers, set descriptions and wait for ICE gathering entirely through
//! this trait, so they never depend on the concrete peer connection type.

mod adapter;
mod session_description;

pub use adapter::{new_peer_connection, WebrtcAdapter};
pub use session_description::SessionDescription;

use async_trait::async_trait;
use thiserror::Error;

pub const DATA_CHANNEL_LABEL: &str = "private";

#[derive(Debug, Error)]
pub enum WebRtcError {
    #[error("failed to create peer connection: {0}")]
    PeerConnection(String),

    #[error("failed to create data channel: {0}")]
    DataChannel(String),

    #[error("failed to create offer/answer: {0}")]
    Negotiation(String),

    #[error("failed to set local/remote description: {0}")]
    SetDescription(String),

    #[error("failed waiting for ICE gathering to complete: {0}")]
    IceGathering(String),

    #[error("failed to decode session description JSON: {0}")]
    SessionDescriptionDecode(#[from] serde_json::Error),
}

/// Everything a protocol handler needs from a live peer connection:
/// creating the data channel, the offer/answer round trip, and ICE
/// gathering. Session descriptions cross this boundary as JSON, matching
/// the wire representation the other peer decrypts and parses.
#[async_trait]
pub trait WebRtcCapability: Send + Sync {
    async fn create_data_channel(&self, label: &str) -> Result<(), WebRtcError>;

    async fn create_offer(&self) -> Result<SessionDescription, WebRtcError>;

    async fn create_answer(&self) -> Result<SessionDescription, WebRtcError>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), WebRtcError>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), WebRtcError>;

    /// Resolves once ICE candidate gathering has finished.
    async fn gathering_complete_promise(&self) -> Result<(), WebRtcError>;

    async fn close(&self) -> Result<(), WebRtcError>;
}
