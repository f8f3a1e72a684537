//! The node's shared state, handed to every protocol handler: membership,
//! the challenger, the interaction table, the reaction registry, this
//! node's own signing identity, and the WebRTC connection factory.

use std::sync::Arc;

use async_trait::async_trait;
use cluster::{Challenger, ClusterRegistry};
use interaction::InteractionTable;
use primitives::{EcdsaKeyPair, MemberId};
use reaction::ReactionRegistry;
use telemetry::NodeMetrics;
use webrtc_capability::{WebRtcCapability, WebRtcError};

/// Builds a live [`WebRtcCapability`] per admission. A seam so handler tests
/// can substitute a fake peer connection instead of touching the network.
#[async_trait]
pub trait WebRtcFactory: Send + Sync {
    async fn new_connection(&self, ice_servers: Vec<String>) -> Result<Arc<dyn WebRtcCapability>, WebRtcError>;
}

/// The default factory, backed by the `webrtc` crate via [`webrtc_capability::WebrtcAdapter`].
pub struct NativeWebRtcFactory;

#[async_trait]
impl WebRtcFactory for NativeWebRtcFactory {
    async fn new_connection(&self, ice_servers: Vec<String>) -> Result<Arc<dyn WebRtcCapability>, WebRtcError> {
        let adapter = webrtc_capability::new_peer_connection(ice_servers).await?;
        Ok(Arc::new(adapter))
    }
}

/// Shared, cloneable handle every handler closure captures.
pub struct NodeContext {
    pub self_id: MemberId,
    pub auth_key: EcdsaKeyPair,
    pub stun_server: String,
    pub cluster: Arc<ClusterRegistry>,
    pub challenger: Arc<Challenger>,
    pub interactions: Arc<InteractionTable>,
    pub reactions: Arc<ReactionRegistry>,
    pub metrics: Arc<NodeMetrics>,
    pub webrtc: Arc<dyn WebRtcFactory>,
}

impl NodeContext {
    /// `min(minNetworkConns, clusterSize())`, the endorsement quorum size a
    /// new candidate must assemble.
    pub fn required_endorsements(&self) -> usize {
        const MIN_NETWORK_CONNS: usize = 5;
        MIN_NETWORK_CONNS.min(self.cluster.size())
    }
}
