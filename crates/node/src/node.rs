//! Assembles every lower-level crate into one running node: loads identity,
//! starts the dispatcher's worker pool, and keeps the periodic sweepers and
//! teardown hooks that keep the reaction registry and challenger bounded.

use std::sync::Arc;
use std::time::Duration;

use cluster::{Challenger, ClusterRegistry};
use dispatcher::Dispatcher;
use interaction::{Connection, InteractionTable};
use primitives::{EcdsaPublicKey, IncomeSignal, MemberId};
use reaction::ReactionRegistry;
use telemetry::{info, NodeMetrics};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::NodeConfig;
use crate::context::{NativeWebRtcFactory, NodeContext};
use crate::error::Result;
use crate::handlers::build_handler_map;
use crate::key_store::FileKeyStore;
use crate::lifecycle::Lifecycle;

/// How often the background sweeper clears expired challenger and reaction
/// entries whose deadline elapsed without ever being polled inline.
const SWEEP_INTERVAL: Duration = Duration::from_secs(10);

/// A fully wired, running node: the shared context every handler closes
/// over, the dispatcher's worker pool, and the teardown registry that
/// unwinds them on shutdown.
pub struct Node {
    ctx: Arc<NodeContext>,
    lifecycle: Arc<Lifecycle>,
    inbox_tx: mpsc::Sender<IncomeSignal>,
}

/// Inbox backpressure before a worker has caught up; signals beyond this
/// many in flight block the sending interaction's pump task.
const INBOX_CAPACITY: usize = 1024;

impl Node {
    /// Loads (or generates) this node's identity, wires every crate into a
    /// shared [`NodeContext`], spawns the dispatcher's workers and the
    /// periodic sweepers, and returns the running node.
    pub async fn start(config: NodeConfig) -> Result<Arc<Self>> {
        let key_store = FileKeyStore::load_or_generate(&config)?;

        let cluster = Arc::new(ClusterRegistry::new());
        let challenger = Arc::new(Challenger::new());
        let reactions = Arc::new(ReactionRegistry::new());
        let metrics = Arc::new(NodeMetrics::new());
        let interactions = Arc::new(InteractionTable::new(config.id.clone(), metrics.clone()));

        let ctx = Arc::new(NodeContext {
            self_id: config.id.clone(),
            auth_key: key_store.key_pair().clone(),
            stun_server: config.stun_server.clone(),
            cluster,
            challenger,
            interactions,
            reactions,
            metrics,
            webrtc: Arc::new(NativeWebRtcFactory),
        });

        let (inbox_tx, inbox_rx) = mpsc::channel(INBOX_CAPACITY);
        let handlers = build_handler_map(ctx.clone());
        let dispatcher = Dispatcher::new(inbox_rx, ctx.reactions.clone(), handlers, ctx.metrics.clone());
        let worker_handles = dispatcher.spawn_workers(config.workers_num);

        let lifecycle = Lifecycle::new();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sweeper_handle = spawn_sweeper(ctx.clone(), shutdown_rx);

        register_dispatcher_teardown(&lifecycle, worker_handles).await;
        register_sweeper_teardown(&lifecycle, shutdown_tx, sweeper_handle).await;

        info!(id = %ctx.self_id, workers = config.workers_num, "node started");

        Ok(Arc::new(Self {
            ctx,
            lifecycle,
            inbox_tx,
        }))
    }

    /// The shared context every handler and transport adapter reads from.
    pub fn context(&self) -> &Arc<NodeContext> {
        &self.ctx
    }

    pub fn id(&self) -> &MemberId {
        &self.ctx.self_id
    }

    /// Admits `id` as a known cluster member, able to pass `doVerify`'s
    /// membership check. Typically driven by an out-of-band provisioning
    /// step, not by anything on the wire.
    pub fn register_member(&self, id: MemberId, auth_key: EcdsaPublicKey) {
        self.ctx.cluster.insert(id, auth_key);
    }

    /// Registers a newly accepted transport connection, wiring its inbound
    /// stream through the filter chain into the dispatcher's shared inbox.
    /// This is the real glue behind the protocol's `newConnection` concept;
    /// the first hop that produces `conn` (accepting a socket, a WebSocket
    /// upgrade, ...) is out of scope for this engine.
    pub fn accept_connection(self: &Arc<Self>, conn: Arc<dyn Connection>) -> MemberId {
        let interactions = self.ctx.interactions.clone();
        let disconnect_id = conn.id();
        interactions.add(
            conn,
            self.inbox_tx.clone(),
            Box::new(move || {
                info!(peer = %disconnect_id, "peer connection torn down");
            }),
        )
    }

    /// Runs every registered teardown hook, stopping the dispatcher's
    /// workers and the periodic sweeper.
    pub async fn shutdown(&self) {
        self.lifecycle.teardown().await;
    }
}

fn spawn_sweeper(ctx: Arc<NodeContext>, mut shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    ctx.challenger.sweep_expired();
                    ctx.reactions.sweep_expired();
                    ctx.metrics.emit();
                }
                _ = shutdown_rx.changed() => {
                    break;
                }
            }
        }
    })
}

async fn register_dispatcher_teardown(lifecycle: &Arc<Lifecycle>, worker_handles: Vec<JoinHandle<()>>) {
    lifecycle
        .register(move || async move {
            for handle in worker_handles {
                handle.abort();
            }
        })
        .await;
}

async fn register_sweeper_teardown(
    lifecycle: &Arc<Lifecycle>,
    shutdown_tx: watch::Sender<bool>,
    sweeper_handle: JoinHandle<()>,
) {
    lifecycle
        .register(move || async move {
            let _ = shutdown_tx.send(true);
            let _ = sweeper_handle.await;
        })
        .await;
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use interaction::ChannelConnection;
    use primitives::{EcdsaKeyPair, NetworkSignal, SignalType};
    use tempfile::tempdir;

    use super::*;

    fn config_at(dir: &std::path::Path) -> NodeConfig {
        NodeConfig {
            id: MemberId::new("A".repeat(52)).unwrap(),
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 0),
            entry_point: None,
            workers_num: 1,
            stun_server: String::from("stun:stun.example.org:19302"),
            private_auth_key_path: dir.join("private.pem"),
            public_auth_key_path: dir.join("public.pem"),
        }
    }

    #[tokio::test]
    async fn starts_and_shuts_down_cleanly() {
        let dir = tempdir().unwrap();
        let node = Node::start(config_at(dir.path())).await.unwrap();
        assert_eq!(node.id(), &MemberId::new("A".repeat(52)).unwrap());
        node.shutdown().await;
    }

    #[tokio::test]
    async fn accepted_connection_reaches_not_verified_state() {
        let dir = tempdir().unwrap();
        let node = Node::start(config_at(dir.path())).await.unwrap();

        let peer_id = MemberId::new("B".repeat(52)).unwrap();
        let (conn, _inbound_tx) = ChannelConnection::new(peer_id.clone());
        node.accept_connection(Arc::new(conn));

        let interaction = node.context().interactions.get(&peer_id).unwrap();
        assert_eq!(interaction.state(), interaction::InteractionState::NotVerified);

        node.shutdown().await;
    }

    #[tokio::test]
    async fn registered_member_is_known_to_cluster() {
        let dir = tempdir().unwrap();
        let node = Node::start(config_at(dir.path())).await.unwrap();

        let member_id = MemberId::new("C".repeat(52)).unwrap();
        let auth_key = EcdsaKeyPair::generate().verifying_key();
        node.register_member(member_id.clone(), auth_key);

        assert!(node.context().cluster.is_member(&member_id));

        node.shutdown().await;
    }

    #[tokio::test]
    async fn ping_from_a_connected_peer_is_handled_without_panicking() {
        let dir = tempdir().unwrap();
        let node = Node::start(config_at(dir.path())).await.unwrap();

        let peer_id = MemberId::new("D".repeat(52)).unwrap();
        let (conn, inbound_tx) = ChannelConnection::new(peer_id.clone());
        node.accept_connection(Arc::new(conn));
        node.context()
            .interactions
            .cas(&peer_id, interaction::InteractionState::NotVerified, interaction::InteractionState::Connected);

        inbound_tx
            .send(NetworkSignal::new(SignalType::Ping, vec![]))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        node.shutdown().await;
    }
}
