//! Node configuration: the recognized options (id, listen address, entry
//! point, worker count, STUN server, auth key paths), loaded from a file via
//! the `config` crate and assembled with `derive_builder`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use config::{Config, File};
use derive_builder::Builder;
use primitives::MemberId;
use serde::Deserialize;

use crate::error::{NodeError, Result};

/// Worker pool size the dispatcher spawns by default when a config doesn't
/// specify one.
pub const DEFAULT_WORKERS_NUM: usize = 4;

#[derive(Builder, Debug, Clone, Deserialize)]
#[builder(setter(into), build_fn(error = "derive_builder::UninitializedFieldError"))]
pub struct NodeConfig {
    /// This node's own 52-byte member id.
    pub id: MemberId,

    /// Address this node's transport listens for inbound connections on.
    pub listen_addr: SocketAddr,

    /// Address of an existing cluster member to bootstrap membership
    /// information from. `None` for a node starting its own cluster.
    #[builder(default)]
    pub entry_point: Option<SocketAddr>,

    /// Number of dispatcher worker tasks.
    #[builder(default = "DEFAULT_WORKERS_NUM")]
    pub workers_num: usize,

    /// STUN server URL handed to peers in `ConnectionSign.stun_server`.
    pub stun_server: String,

    /// Path to this node's ECDSA P-256 private auth key, PEM-encoded.
    pub private_auth_key_path: PathBuf,

    /// Path to this node's ECDSA P-256 public auth key, PEM-encoded.
    pub public_auth_key_path: PathBuf,
}

impl NodeConfig {
    /// Loads configuration from a file (any format `config` recognizes by
    /// extension: TOML, YAML, JSON, ...).
    pub fn from_file(config_path: &str) -> Result<Self> {
        let built = Config::builder()
            .add_source(File::with_name(config_path))
            .build()?;

        built.try_deserialize().map_err(NodeError::Config)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        let localhost = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 0);
        Self {
            id: MemberId::new("A".repeat(52)).expect("52 'A's is a valid MemberId"),
            listen_addr: localhost,
            entry_point: None,
            workers_num: DEFAULT_WORKERS_NUM,
            stun_server: String::from("stun:stun.l.google.com:19302"),
            private_auth_key_path: PathBuf::from("./auth_private.pem"),
            public_auth_key_path: PathBuf::from("./auth_public.pem"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_in_documented_defaults() {
        let id = MemberId::new("B".repeat(52)).unwrap();
        let config = NodeConfigBuilder::default()
            .id(id.clone())
            .listen_addr(SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 9000))
            .stun_server("stun:stun.example.org:19302")
            .private_auth_key_path(PathBuf::from("/tmp/priv.pem"))
            .public_auth_key_path(PathBuf::from("/tmp/pub.pem"))
            .build()
            .unwrap();

        assert_eq!(config.id, id);
        assert_eq!(config.workers_num, DEFAULT_WORKERS_NUM);
        assert_eq!(config.entry_point, None);
    }

    #[test]
    fn default_config_is_self_consistent() {
        let config = NodeConfig::default();
        assert_eq!(config.workers_num, DEFAULT_WORKERS_NUM);
    }
}
