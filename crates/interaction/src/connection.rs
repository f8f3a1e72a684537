//! The transport capability the interaction table builds on. The first hop
//! of a signal (e.g. the web socket accepting a candidate's connection) is
//! out of scope here; this trait is the seam the table uses to stay
//! transport-agnostic.

use async_trait::async_trait;
use primitives::{MemberId, NetworkSignal};
use tokio::sync::mpsc;

/// Required of a transport adapter: identify the peer, and bridge an
/// outbound signal stream to an inbound one. Closing either stream ends
/// the interaction.
#[async_trait]
pub trait Connection: Send + Sync {
    fn id(&self) -> MemberId;

    /// Takes ownership of the outbound receiver (signals the table wants
    /// delivered to this peer) and returns a receiver of signals arriving
    /// from the peer. Implementations typically spawn a task that pumps
    /// both directions over the underlying socket.
    async fn interact(&self, outbound: mpsc::Receiver<NetworkSignal>) -> mpsc::Receiver<NetworkSignal>;
}

/// An in-memory [`Connection`] that simply loops the outbound stream back
/// unless fed inbound signals explicitly. Used by tests exercising the
/// interaction table and filter chain without a real transport.
pub struct ChannelConnection {
    id: MemberId,
    inbound_rx: std::sync::Mutex<Option<mpsc::Receiver<NetworkSignal>>>,
}

impl ChannelConnection {
    pub fn new(id: MemberId) -> (Self, mpsc::Sender<NetworkSignal>) {
        let (inbound_tx, inbound_rx) = mpsc::channel(OUTBOUND_TEST_CAPACITY);
        let conn = Self {
            id,
            inbound_rx: std::sync::Mutex::new(Some(inbound_rx)),
        };
        (conn, inbound_tx)
    }
}

const OUTBOUND_TEST_CAPACITY: usize = 64;

#[async_trait]
impl Connection for ChannelConnection {
    fn id(&self) -> MemberId {
        self.id.clone()
    }

    async fn interact(
        &self,
        mut outbound: mpsc::Receiver<NetworkSignal>,
    ) -> mpsc::Receiver<NetworkSignal> {
        // Drain and discard anything sent to the peer; tests observe
        // outbound traffic by holding on to the table's sender directly.
        tokio::spawn(async move { while outbound.recv().await.is_some() {} });

        self.inbound_rx
            .lock()
            .expect("inbound receiver taken twice")
            .take()
            .expect("interact called more than once")
    }
}
