//! The node's aggregate error type. Every crate boundary below `node` owns
//! its own `thiserror` enum; `NodeError` folds them together so callers at
//! the top (the CLI, integration tests) have one type to match on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("cluster error: {0}")]
    Cluster(#[from] cluster::ClusterError),

    #[error("interaction error: {0}")]
    Interaction(#[from] interaction::InteractionError),

    #[error("wire codec error: {0}")]
    Wire(#[from] primitives::WireError),

    #[error("crypto error: {0}")]
    Crypto(#[from] primitives::CryptoError),

    #[error("webrtc error: {0}")]
    WebRtc(#[from] webrtc_capability::WebRtcError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("configuration is incomplete: {0}")]
    ConfigBuilder(String),

    #[error("member id error: {0}")]
    MemberId(#[from] primitives::id::MemberIdError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, NodeError>;
