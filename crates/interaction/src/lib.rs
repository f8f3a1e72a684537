//! Per-peer interaction state machine: the record each connected peer gets
//! in the node (state, outbound sink, teardown hook), the inbound filter
//! chain applied before a signal reaches the shared dispatcher inbox, and
//! the table that owns every live interaction.

mod connection;
mod filters;
mod interaction;
mod state;
mod table;

pub use connection::{ChannelConnection, Connection};
pub use interaction::{DisconnectHook, Interaction};
pub use state::InteractionState;
pub use table::InteractionTable;

use thiserror::Error;

/// Signals queue at most this many outbound messages per peer before the
/// non-blocking send policy disconnects them.
pub const OUTBOUND_SINK_CAPACITY: usize = 256;

/// Rolling-minute cap on inbound signals per peer.
pub const MAX_MESSAGES_PER_MINUTE: usize = 600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InteractionError {
    #[error("no interaction registered for this id")]
    UnknownPeer,

    #[error("outbound sink full, peer disconnected")]
    BackpressureExceeded,

    #[error("state transition {from:?} -> {to:?} is not monotonic")]
    NonMonotonicTransition {
        from: InteractionState,
        to: InteractionState,
    },
}
